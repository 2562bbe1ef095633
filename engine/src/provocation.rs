//! Provocation: turn the raw friction into a calibrated problem statement.

use vantage_types::{AuditAction, Calibration, Phase, VantageError};

use crate::Session;

impl Session {
    /// Record the calibration answers and compose the friction statement.
    ///
    /// Allowed in any phase; a second call overwrites the first.
    pub fn calibrate(&mut self, calibration: Calibration) -> &str {
        let statement = calibration.friction_statement(&self.friction);
        tracing::debug!(
            session_id = %self.id,
            statement_chars = statement.chars().count(),
            "Friction calibrated"
        );
        self.audit_log.record(AuditAction::Calibrated {
            data: calibration.clone(),
            output: statement.clone(),
        });
        self.calibration = Some(calibration);
        self.friction_statement.insert(statement).as_str()
    }

    pub fn complete_provocation(&mut self) -> Result<Phase, VantageError> {
        if self.friction_statement.is_none() {
            return Err(VantageError::precondition(
                "calibrate the friction before completing provocation",
            ));
        }
        self.advance_phase(Phase::Expedition)
    }
}

#[cfg(test)]
mod tests {
    use vantage_types::{AuditAction, Calibration, ErrorKind, Mode, Phase};

    use crate::Session;

    fn calibration(what_wrong: &str) -> Calibration {
        Calibration {
            what_wrong: what_wrong.into(),
            how_long: "3 months".into(),
            what_right: "green builds".into(),
        }
    }

    #[test]
    fn calibrate_composes_statement_and_audits() {
        let mut session = Session::new("deploys break", Mode::Standalone);
        let statement = session.calibrate(calibration("CI flaky")).to_string();
        assert_eq!(
            statement,
            "Friction: deploys break. Specifically: CI flaky. Duration: 3 months. Target state: green builds."
        );
        let event = session.audit_log().last().unwrap();
        assert_eq!(event.phase, Phase::Provocation);
        assert!(matches!(&event.action, AuditAction::Calibrated { output, .. } if *output == statement));
    }

    #[test]
    fn calibrate_twice_overwrites() {
        let mut session = Session::new("deploys break", Mode::Standalone);
        session.calibrate(calibration("first"));
        session.calibrate(calibration("second"));
        assert!(session.friction_statement().unwrap().contains("Specifically: second."));
        assert_eq!(session.calibration().unwrap().what_wrong, "second");
        assert_eq!(session.audit_log().len(), 2);
    }

    #[test]
    fn complete_provocation_requires_statement() {
        let mut session = Session::new("deploys break", Mode::Standalone);
        let err = session.complete_provocation().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(session.phase(), Phase::Provocation);

        session.calibrate(calibration("CI flaky"));
        assert_eq!(session.complete_provocation().unwrap(), Phase::Expedition);
    }
}
