//! Small helpers shared by the request engine.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// Render `script` with its parameters substituted in, for human inspection.
///
/// Only whole identifiers outside quoted string literals are replaced, in a
/// single pass, so substituted values are never rescanned. String values are
/// single-quoted; everything else is written as JSON text. The output is
/// never sent to the server.
///
/// ```
/// use gizmo::util::render_query;
/// use serde_json::json;
///
/// let params = json!({"vid": 7, "name": "alice"});
/// let rendered = render_query("g.V(vid).has('name', name)", params.as_object().unwrap());
/// assert_eq!(rendered, "g.V(7).has('name', 'alice')");
/// ```
pub fn render_query(script: &str, params: &Map<String, Value>) -> String {
    let mut names: Vec<&String> = params.keys().filter(|name| !name.is_empty()).collect();
    if names.is_empty() {
        return script.to_string();
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = names
        .iter()
        .map(|name| regex::escape(name.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    let pattern =
        format!(r#"(?s)'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|\b(?:{alternation})\b"#);
    let Ok(matcher) = Regex::new(&pattern) else {
        return script.to_string();
    };

    matcher
        .replace_all(script, |caps: &Captures<'_>| {
            let matched = caps.get(0).map_or("", |m| m.as_str());
            match params.get(matched) {
                Some(value) if !matched.starts_with(['\'', '"']) => render_value(value),
                _ => matched.to_string(),
            }
        })
        .into_owned()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

/// Monotonic stopwatch for timing one exchange.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
    stopped: Option<Instant>,
}

impl Timer {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Freeze the elapsed time; later calls keep the first stop.
    pub fn stop(&mut self) -> Duration {
        let stopped = *self.stopped.get_or_insert_with(Instant::now);
        stopped.saturating_duration_since(self.started)
    }

    /// Time since start, or until stop if the timer was stopped.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.stopped
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.started)
    }
}

/// Milliseconds as a float, the unit trace entries and logs use.
#[must_use]
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
