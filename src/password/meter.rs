use super::{evaluate, Verdict};
use crate::table::render::Document;

const CHECKLIST: [&str; 5] = [
    "At least 8 characters",
    "Uppercase letter",
    "Lowercase letter",
    "Digit",
    "Symbol",
];

fn checklist_entry(met: bool, label: &str) -> String {
    let (class, icon) = if met {
        ("text-success", "check-circle-fill")
    } else {
        ("text-muted", "circle")
    };
    format!(
        "      <div class=\"col-6\"><span class=\"{class}\"><i class=\"bi bi-{icon}\"></i> {label}</span></div>\n"
    )
}

/// Progress bar plus checklist for one verdict.
pub fn render_meter(verdict: &Verdict) -> String {
    let percent = verdict.score.min(100);
    let color = verdict.color();
    let c = verdict.checks;
    let flags = [c.length, c.uppercase, c.lowercase, c.digit, c.special];

    let mut out = format!(
        "<div class=\"mb-2\">\n  <div class=\"progress\" style=\"height: 8px;\">\n    <div class=\"progress-bar bg-{color}\" role=\"progressbar\" style=\"width: {percent}%\" aria-valuenow=\"{percent}\" aria-valuemin=\"0\" aria-valuemax=\"100\"></div>\n  </div>\n</div>\n<div class=\"small\">\n  <div class=\"text-{color} mb-2\"><strong>{}</strong></div>\n  <div class=\"row g-2\">\n",
        verdict.message
    );
    for (met, label) in flags.into_iter().zip(CHECKLIST) {
        out.push_str(&checklist_entry(met, label));
    }
    out.push_str("  </div>\n</div>\n");
    out
}

/// Binds a password input to the element showing its meter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordMeter {
    pub input_id: String,
    pub meter_id: String,
}

impl PasswordMeter {
    pub fn new(input_id: impl Into<String>, meter_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
            meter_id: meter_id.into(),
        }
    }

    /// Handles one input change: redraws the meter and records the verdict on the input.
    ///
    /// Does nothing when either element is missing.
    pub fn on_input(&self, doc: &mut dyn Document, password: &str) -> Option<Verdict> {
        doc.element(&self.input_id)?;
        let verdict = evaluate(password);
        doc.element(&self.meter_id)?
            .replace_markup(&render_meter(&verdict));
        if let Some(input) = doc.element(&self.input_id) {
            input.set_data("password-valid", if verdict.valid { "true" } else { "false" });
            input.set_data("password-strength", verdict.tier.as_str());
        }
        Some(verdict)
    }
}
