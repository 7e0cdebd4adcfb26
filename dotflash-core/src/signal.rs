/// The three photodiode indicators, ordered by their configured height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalIndicator {
    Low,
    Mid,
    High,
}

impl SignalIndicator {
    pub const ALL: [SignalIndicator; 3] = [Self::Low, Self::Mid, Self::High];

    pub fn index(&self) -> usize {
        match self {
            SignalIndicator::Low => 0,
            SignalIndicator::Mid => 1,
            SignalIndicator::High => 2,
        }
    }
}

/// On/off state of the indicator boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalPanel {
    active: [bool; 3],
}

impl SignalPanel {
    pub fn dark() -> Self {
        Self::default()
    }

    pub fn with(indicators: &[SignalIndicator]) -> Self {
        let mut panel = Self::dark();
        for indicator in indicators {
            panel.active[indicator.index()] = true;
        }
        panel
    }

    /// Pattern lit when the flash begins.
    ///
    /// Practice trials light everything. Otherwise only the documented
    /// `(initial, change)` pairs light anything; every other pair stays dark.
    pub fn for_flash(practice: bool, initial_control: i32, control_change: i32) -> Self {
        use SignalIndicator::*;

        if practice {
            return Self::with(&[Low, Mid, High]);
        }

        match (initial_control, control_change) {
            (100, 70) => Self::with(&[Low, High]),
            (100, 100) => Self::with(&[Low, Mid]),
            (100, _) => Self::with(&[Low]),
            (0, 30) => Self::with(&[High]),
            (0, 70) => Self::with(&[Mid]),
            (0, 100) => Self::with(&[Mid, High]),
            _ => Self::dark(),
        }
    }

    pub fn is_active(&self, indicator: SignalIndicator) -> bool {
        self.active[indicator.index()]
    }

    pub fn is_dark(&self) -> bool {
        !self.active.iter().any(|on| *on)
    }

    pub fn active(&self) -> Vec<SignalIndicator> {
        SignalIndicator::ALL
            .into_iter()
            .filter(|i| self.is_active(*i))
            .collect()
    }
}
