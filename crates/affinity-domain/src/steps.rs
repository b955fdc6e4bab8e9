//! Step tables - named threshold policies for the bucketed components
//!
//! Each table is an ordered list of `(upper_bound, score)` pairs. A value
//! maps to the score of the first entry whose bound it is strictly below,
//! or to the table's `otherwise` score when it exceeds every bound.

/// An ordered `(threshold, score)` policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTable {
    /// Human-readable name of the measured quantity
    pub name: &'static str,
    /// `(exclusive upper bound, score)` pairs in ascending bound order
    pub steps: &'static [(f64, u8)],
    /// Score for values at or above the last bound
    pub otherwise: u8,
}

impl StepTable {
    /// Map a measured value to its bucket score
    ///
    /// # Examples
    ///
    /// ```
    /// use affinity_domain::steps::RECENCY_HOURS;
    ///
    /// assert_eq!(RECENCY_HOURS.lookup(0.5), 100);
    /// assert_eq!(RECENCY_HOURS.lookup(1.0), 90);
    /// assert_eq!(RECENCY_HOURS.lookup(10_000.0), 5);
    /// ```
    pub fn lookup(&self, value: f64) -> u8 {
        self.steps
            .iter()
            .find(|(bound, _)| value < *bound)
            .map(|(_, score)| *score)
            .unwrap_or(self.otherwise)
    }
}

/// Hours since the latest interaction
pub const RECENCY_HOURS: StepTable = StepTable {
    name: "hours since last interaction",
    steps: &[
        (1.0, 100),
        (6.0, 90),
        (24.0, 75),
        (72.0, 55),
        (168.0, 35),
        (720.0, 15),
    ],
    otherwise: 5,
};

/// Months (of 30 days) since the relationship was established
pub const DURATION_MONTHS: StepTable = StepTable {
    name: "months since established",
    steps: &[
        (0.1, 5),
        (1.0, 20),
        (3.0, 40),
        (6.0, 60),
        (12.0, 80),
    ],
    otherwise: 100,
};

/// Mean gap in days between consecutive recent interactions
pub const CONSISTENCY_GAP_DAYS: StepTable = StepTable {
    name: "mean days between interactions",
    steps: &[
        (1.0, 100),
        (3.0, 80),
        (7.0, 50),
        (14.0, 25),
    ],
    otherwise: 10,
};
