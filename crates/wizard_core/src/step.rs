/// Wizard stage. The numeric value is the 1-based step shown in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Select = 1,
    Configure = 2,
    Finish = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Select, Step::Configure, Step::Finish];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Select => Some(Step::Configure),
            Step::Configure => Some(Step::Finish),
            Step::Finish => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Select => "Choose data source",
            Step::Configure => "Text preprocessing and cleaning",
            Step::Finish => "Execute and finish",
        }
    }
}

/// Single writer of the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepController {
    current: Step,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Advances exactly one step when `gate` holds. Finish is terminal.
    pub fn go_forward(&mut self, gate: bool) -> bool {
        if !gate {
            return false;
        }
        match self.current.next() {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Moves back by `delta`; only Configure -> Select exists.
    pub fn go_back(&mut self, delta: u8) -> bool {
        if self.current == Step::Configure && delta == 1 {
            self.current = Step::Select;
            true
        } else {
            false
        }
    }
}
