//! Which primary-panel indicators may be transferred

use std::collections::BTreeSet;
use tracing::debug;

use crate::constants::indicator;

/// Names registered on the primary panel that are not session chrome
pub fn compute_available<'a, P, S>(primary_names: P, session_allow_list: S) -> BTreeSet<String>
where
    P: IntoIterator<Item = &'a str>,
    S: IntoIterator<Item = &'a str>,
{
    let excluded: BTreeSet<&str> = session_allow_list.into_iter().collect();
    primary_names
        .into_iter()
        .filter(|name| !excluded.contains(name))
        .map(str::to_string)
        .collect()
}

/// Recomputes the available set on every call and reports membership changes
#[derive(Debug, Default)]
pub struct SessionFilter {
    last: Option<BTreeSet<String>>,
}

impl SessionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session chrome from the host plus the extension's own indicator
    pub fn allow_list(session_indicators: &[String]) -> Vec<String> {
        std::iter::once(indicator::OWN_INDICATOR.to_string())
            .chain(session_indicators.iter().cloned())
            .collect()
    }

    /// Recompute; returns the new set only if its membership changed
    pub fn update<'a, P, S>(&mut self, primary_names: P, session_allow_list: S) -> Option<&BTreeSet<String>>
    where
        P: IntoIterator<Item = &'a str>,
        S: IntoIterator<Item = &'a str>,
    {
        let available = compute_available(primary_names, session_allow_list);
        if self.last.as_ref() == Some(&available) {
            debug!(count = available.len(), "Available indicators unchanged");
            return None;
        }
        debug!(available = ?available, "Available indicators changed");
        self.last = Some(available);
        self.last.as_ref()
    }

    pub fn current(&self) -> Option<&BTreeSet<String>> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
