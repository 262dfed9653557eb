//! Server-rendered HTML for the prediction form and about page.

use std::collections::HashMap;
use std::fmt::Write;

use crate::stats::COUNTER_NAMES;

/// What to show above the form after a submission.
pub enum Outcome {
    Predicted { label: String, probability: f64 },
    Failed(String),
}

const COUNTER_LABELS: [&str; 8] = [
    "Field goals made",
    "Field goals attempted",
    "Three-pointers made",
    "Free throws made",
    "Free throws attempted",
    "Total rebounds",
    "Offensive rebounds",
    "Turnovers",
];

/// Factor suffix and label, one row per factor.
const FACTOR_ROWS: [(&str, &str); 4] = [
    ("efg", "Effective FG%"),
    ("tov", "Turnover rate"),
    ("drb", "Defensive rebound rate"),
    ("ftr", "Free throw rate"),
];

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{title}}", title)
        .replace("{{body}}", body)
}

fn input(name: &str, step: &str, fields: &HashMap<String, String>) -> String {
    let value = fields.get(name).map(|v| escape_html(v)).unwrap_or_default();
    format!(
        r#"<input type="number" min="0" step="{step}" name="{name}" value="{value}" required>"#
    )
}

fn outcome_panel(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Predicted { label, probability } => format!(
            r#"<div class="panel result"><div class="label">Predicted winner</div><div class="value">{}</div><div class="label">Probability</div><div class="value">{:.3}</div></div>"#,
            escape_html(label),
            probability
        ),
        Outcome::Failed(message) => format!(
            r#"<div class="panel error">{}</div>"#,
            escape_html(message)
        ),
    }
}

/// Which of the two forms a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmittedForm {
    BoxScore,
    FourFactors,
}

/// Both prediction forms. Only the form named by `submitted` is pre-filled
/// with `fields`: the two share the `h_tov`/`a_tov` names but not their units.
pub fn render_predict(
    submitted: Option<(SubmittedForm, &HashMap<String, String>)>,
    outcome: Option<Outcome>,
) -> String {
    let empty = HashMap::new();
    let (box_fields, factor_fields) = match submitted {
        Some((SubmittedForm::BoxScore, fields)) => (fields, &empty),
        Some((SubmittedForm::FourFactors, fields)) => (&empty, fields),
        None => (&empty, &empty),
    };

    let mut body = String::new();
    if let Some(outcome) = &outcome {
        body.push_str(&outcome_panel(outcome));
    }

    body.push_str(
        r#"<form class="panel" method="post" action="/predict"><div class="panel-header">Box score</div><table><thead><tr><th></th><th>Home</th><th>Away</th></tr></thead><tbody>"#,
    );
    for (name, label) in COUNTER_NAMES.iter().zip(COUNTER_LABELS) {
        let _ = write!(
            body,
            "<tr><td>{label}</td><td>{}</td><td>{}</td></tr>",
            input(&format!("h_{name}"), "1", box_fields),
            input(&format!("a_{name}"), "1", box_fields),
        );
    }
    body.push_str(r#"</tbody></table><button type="submit">Predict</button></form>"#);

    body.push_str(
        r#"<details class="panel"><summary>Already have the four factors?</summary><form method="post" action="/fourfactors_predict"><table><thead><tr><th></th><th>Home</th><th>Away</th></tr></thead><tbody>"#,
    );
    for (suffix, label) in FACTOR_ROWS {
        let _ = write!(
            body,
            "<tr><td>{label}</td><td>{}</td><td>{}</td></tr>",
            input(&format!("h_{suffix}"), "any", factor_fields),
            input(&format!("a_{suffix}"), "any", factor_fields),
        );
    }
    body.push_str(r#"</tbody></table><button type="submit">Predict</button></form></details>"#);

    page("Predict", &body)
}

pub fn render_about() -> String {
    page("About", ABOUT_BODY)
}

const ABOUT_BODY: &str = r#"<div class="panel prose">
<h2>Four Factors</h2>
<p>Dean Oliver identified four factors that decide most basketball games. Each is computed for both sides from the box score:</p>
<ul>
  <li><strong>Shooting</strong>: effective field goal percentage, (FG + 0.5 &times; 3P) / FGA. A made three counts one and a half times.</li>
  <li><strong>Turnovers</strong>: turnovers per possession, TOV / (FGA + 0.44 &times; FTA + TOV).</li>
  <li><strong>Rebounding</strong>: defensive rebound percentage, DRB / (opponent ORB + DRB).</li>
  <li><strong>Free throws</strong>: free throws made per field goal attempt, FT / FGA.</li>
</ul>
<p>The eight values are fed to a logistic regression trained on past games. It returns the side it expects to have won and how confident it is, between 0.5 and 1.</p>
<p>A box score with no field goal attempts or no rebounds on either side has undefined factors and is rejected.</p>
</div>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{title}} · Four Factors Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1.5rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  header a { color: var(--muted); text-decoration: none; font-size: .9rem; }
  header a:hover { color: var(--accent); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; max-width: 720px; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel-header, summary { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; cursor: default; }
  summary { cursor: pointer; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .45rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  input { width: 7rem; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .3rem .5rem; }
  button { margin: 1rem; background: var(--accent); color: #fff; border: none; padding: .5rem 1.4rem; border-radius: 6px; cursor: pointer; font-weight: 600; }
  .result { padding: 1.2rem; display: grid; grid-template-columns: auto 1fr; gap: .4rem 1rem; align-items: baseline; }
  .result .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; }
  .result .value { font-size: 1.5rem; font-weight: 700; color: var(--green); }
  .error { padding: 1rem 1.2rem; color: var(--red); }
  .prose { padding: 1.2rem; line-height: 1.6; }
  .prose h2 { margin-bottom: .6rem; }
  .prose ul { margin: .6rem 0 .6rem 1.4rem; }
  .prose p { margin-bottom: .6rem; }
</style>
</head>
<body>
<header>
  <h1>🏀 Four Factors Predictor</h1>
  <a href="/predict">Predict</a>
  <a href="/about">About</a>
</header>
<main>
{{body}}
</main>
</body>
</html>"#;
