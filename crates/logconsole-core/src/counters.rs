use logconsole_types::Severity;

/// Running totals per severity
///
/// Only the view engine updates these; callers get read access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    info: usize,
    warning: usize,
    error: usize,
}

impl SeverityCounts {
    pub fn info(&self) -> usize {
        self.info
    }

    pub fn warning(&self) -> usize {
        self.warning
    }

    pub fn error(&self) -> usize {
        self.error
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error
    }

    pub(crate) fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info += 1,
            Severity::Warning => self.warning += 1,
            Severity::Error => self.error += 1,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_total() {
        let mut counts = SeverityCounts::default();
        counts.record(Severity::Info);
        counts.record(Severity::Error);
        counts.record(Severity::Error);

        assert_eq!(counts.get(Severity::Info), 1);
        assert_eq!(counts.warning(), 0);
        assert_eq!(counts.error(), 2);
        assert_eq!(counts.total(), 3);

        counts.reset();
        assert_eq!(counts, SeverityCounts::default());
    }
}
