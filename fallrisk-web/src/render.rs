//! HTML rendering for the predictor page
//!
//! One page: the input form, pre-filled with the last submission, followed
//! by whatever the last submission produced.

use fallrisk_core::features::{GENDER_FEMALE, GENDER_MALE};
use fallrisk_core::{FeatureName, FeatureRecord, PredictionResult};

pub const PAGE_TITLE: &str = "Fall Risk Prediction";

pub const ODI_URL: &str =
    "https://maic.qld.gov.au/wp-content/uploads/2016/02/Oswestry_Low_Back_Disability_Questionnaire.pdf";

pub const MEASUREMENT_WARNING: &str = "Please complete the Postural Stability and Walking test \
     measurements using the Lockhart Monitor app before prediction.";

/// What to show under the Predict button
#[derive(Debug, Clone)]
pub enum Outcome {
    /// First visit, nothing submitted
    Empty,
    /// Inputs outside the form bounds
    Invalid(Vec<String>),
    /// Device fields still at zero
    Missing(Vec<FeatureName>),
    Prediction(PredictionResult),
    /// Model error, already logged
    Failed,
}

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
.columns { display: flex; gap: 2rem; }
.columns > div { flex: 1; }
label { display: block; margin-top: 0.8rem; font-size: 0.9rem; }
input, select { width: 100%; padding: 0.3rem; box-sizing: border-box; }
.caption, .help { font-size: 0.8rem; color: #808495; }
.info { background: #e8f0fe; padding: 1rem; border-radius: 0.4rem; }
.warning { background: #fffbe6; padding: 1rem; border-radius: 0.4rem; }
.banner { padding: 1rem; border-radius: 0.4rem; margin-top: 0.8rem; }
.banner.high { background: #ffe5e5; color: #7d1a1a; }
.banner.low { background: #e3f6e8; color: #17572b; }
button { margin-top: 1rem; padding: 0.5rem 1.5rem; }
"#;

/// Escape text for HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn number_input(name: FeatureName, label: &str, value: f64, bounds: &str, step: &str, help: &str) -> String {
    let help = if help.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="help">{}</div>"#, escape(help))
    };
    format!(
        r#"<label for="{id}">{label}</label>
<input type="number" id="{id}" name="{id}" value="{value}" step="{step}" {bounds} required>
{help}"#,
        id = name.wire_name(),
        label = escape(label),
    )
}

fn select_input(name: FeatureName, label: &str, selected: u8, options: &[(u8, &str)]) -> String {
    let options: String = options
        .iter()
        .map(|(code, text)| {
            let flag = if *code == selected { " selected" } else { "" };
            format!(r#"<option value="{code}"{flag}>{}</option>"#, escape(text))
        })
        .collect();
    format!(
        r#"<label for="{id}">{label}</label>
<select id="{id}" name="{id}">{options}</select>"#,
        id = name.wire_name(),
        label = escape(label),
    )
}

fn participant_inputs(record: &FeatureRecord) -> String {
    let left = [
        select_input(FeatureName::Gender, "Gender", record.gender, &[(GENDER_FEMALE, "Female"), (GENDER_MALE, "Male")]),
        r#"<div class="caption">Coding: Female = 0, Male = 1</div>"#.to_string(),
        number_input(
            FeatureName::Height,
            "Height (cm)",
            record.height,
            r#"min="80" max="250""#,
            "0.1",
            "",
        ),
        select_input(
            FeatureName::Hypertension,
            "Hypertension (0 = No, 1 = Yes)",
            record.hypertension,
            &[(0, "0"), (1, "1")],
        ),
        r#"<div class="help">0 = No hypertension, 1 = Hypertension present.</div>"#.to_string(),
        number_input(
            FeatureName::MedicationCount,
            "Medication Count",
            f64::from(record.medication_count),
            r#"min="0" max="50""#,
            "1",
            "Total number of regularly used medications.",
        ),
    ]
    .join("\n");

    let right = format!(
        r#"<p><strong>ODI (Oswestry Disability Index)</strong><br>
<a href="{url}" target="_blank" rel="noopener">Open ODI questionnaire PDF</a><br>
Please complete the questionnaire and enter the final ODI score (0–50) below.</p>
{odi}
<p><strong>VAS (Visual Analogue Scale)</strong></p>
<label for="VAS">Low back pain intensity (0 = none, 10 = worst imaginable)</label>
<input type="range" id="VAS" name="VAS" min="0" max="10" step="0.1" value="{vas}"
       oninput="this.nextElementSibling.value = this.value">
<output>{vas}</output>"#,
        url = ODI_URL,
        odi = number_input(
            FeatureName::Odi,
            "ODI Score (0–50)",
            record.odi,
            r#"min="0" max="100""#,
            "0.1",
            "",
        ),
        vas = record.vas,
    );

    format!(
        r#"<h2>Participant Inputs</h2>
<div class="columns"><div>
{left}
</div><div>
{right}
</div></div>"#
    )
}

fn measurement_inputs(record: &FeatureRecord) -> String {
    let device = |name: FeatureName, label: &str, help: &str| {
        number_input(name, label, record.value(name), "", "0.01", help)
    };

    format!(
        r#"<h2>Postural Stability (PS) &amp; Walking (W) Measures</h2>
<div class="info">
<strong>Measurement Requirement</strong><br>
For accurate model performance, <strong>Postural Stability (PS)</strong> and <strong>Walking (W)</strong>
tests must be performed using the <strong>Lockhart Monitor</strong> application.
<p>Please download <strong>Lockhart Monitor</strong> to your smartphone. Follow the in-app instructions to perform:</p>
<ul>
<li><strong>Postural Stability Test:</strong> 30 seconds standing test</li>
<li><strong>Walking Test:</strong> 5-meter walking test</li>
</ul>
After completing the tests, enter the obtained values below.
</div>
<div class="columns"><div>
{psv}
{psa}
{psp}
</div><div>
{wv}
{wd}
</div></div>"#,
        psv = device(
            FeatureName::PsVelocity,
            "Postural Stability Velocity (cm/s)",
            "PS = Postural Stability. Sway velocity during standing."
        ),
        psa = device(
            FeatureName::PsSwayArea,
            "Postural Stability Sway Area (cm²)",
            "PS = Postural Stability. Sway area during standing."
        ),
        psp = device(
            FeatureName::PsSwayPath,
            "Postural Stability Sway Path (cm)",
            "PS = Postural Stability. Total sway path length."
        ),
        wv = device(FeatureName::WVelocity, "Walking Velocity (m/s)", "W = Walking. Walking velocity."),
        wd = device(
            FeatureName::WDuration,
            "Walking Duration (sec)",
            "W = Walking. Duration of the walking task (e.g., seconds)."
        ),
    )
}

fn outcome_block(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Empty => String::new(),
        Outcome::Invalid(messages) => {
            let items: String = messages
                .iter()
                .map(|m| format!("<li>{}</li>", escape(m)))
                .collect();
            format!(r#"<div class="warning">Please correct the following inputs:<ul>{items}</ul></div>"#)
        }
        Outcome::Missing(fields) => {
            let names = fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ");
            format!(
                r#"<div class="warning">⚠️ {}<br><br>Missing or zero values: {}</div>"#,
                escape(MEASUREMENT_WARNING),
                escape(&names)
            )
        }
        Outcome::Prediction(result) => {
            let (class, status) = if result.is_high_risk() {
                ("high", "Predicted: Faller = 1")
            } else {
                ("low", "Predicted: Non-faller = 0")
            };
            format!(
                r#"<p><strong>Probability of Faller:</strong> <code>{:.3}</code></p>
<p><strong>Predicted Fall Status:</strong> <code>{}</code></p>
<div class="banner {class}"><strong>{}</strong> ({status})</div>"#,
                result.probability,
                result.label.code(),
                result.label.banner(),
            )
        }
        Outcome::Failed => {
            r#"<div class="warning">The prediction could not be computed. Please try again later.</div>"#
                .to_string()
        }
    }
}

/// Full predictor page
pub fn page(record: &FeatureRecord, outcome: &Outcome) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{PAGE_TITLE}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Fall risk predictor for older adults (&gt;60 years old) with low back pain</h1>
<p>The predicted fall risk is generated using a trained machine learning model (CatBoost).
This output is intended for <strong>research and supportive screening purposes only</strong>.
Final clinical decisions should always be made by qualified healthcare professionals.</p>
<form method="post" action="/">
{participant}
<hr>
{measurements}
<hr>
<h2>Prediction</h2>
<button type="submit">Predict</button>
</form>
<section id="outcome">
{outcome}
</section>
</body>
</html>
"#,
        participant = participant_inputs(record),
        measurements = measurement_inputs(record),
        outcome = outcome_block(outcome),
    )
}
