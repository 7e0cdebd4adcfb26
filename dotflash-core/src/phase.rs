/// Timeline phases of a single moving-dots trial
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum TrialPhase {
    #[default]
    PreFlash,
    Flashing,
    PostFlash,
    Done,
}

impl TrialPhase {
    /// Forward successor; `Done` is terminal.
    pub fn next(&self) -> Option<Self> {
        use TrialPhase::*;
        Some(match self {
            PreFlash => Flashing,
            Flashing => PostFlash,
            PostFlash => Done,
            Done => return None,
        })
    }

    pub fn is_flashing(&self) -> bool {
        matches!(self, TrialPhase::Flashing)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TrialPhase::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrialPhase::PreFlash => "pre-flash",
            TrialPhase::Flashing => "flashing",
            TrialPhase::PostFlash => "post-flash",
            TrialPhase::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        let mut seen = vec![TrialPhase::default()];
        while let Some(next) = seen.last().and_then(TrialPhase::next) {
            seen.push(next);
        }
        assert_eq!(
            seen,
            vec![
                TrialPhase::PreFlash,
                TrialPhase::Flashing,
                TrialPhase::PostFlash,
                TrialPhase::Done
            ]
        );
    }
}
