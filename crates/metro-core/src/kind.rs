//! Passenger demographics and trip patterns.
//!
//! Neither enum changes how a passenger moves through the network; they are
//! drawn from the configured proportions and carried into the reports.

use serde::{Deserialize, Serialize};

/// Demographic category of a passenger.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerKind {
    #[default]
    Adult,
    Student,
    Disabled,
    Child,
    Senior,
}

impl PassengerKind {
    /// All kinds, in the order used by [`KindProportions::weights`][crate::KindProportions::weights].
    pub const ALL: [PassengerKind; 5] = [
        PassengerKind::Adult,
        PassengerKind::Student,
        PassengerKind::Disabled,
        PassengerKind::Child,
        PassengerKind::Senior,
    ];

    /// Label used in CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            PassengerKind::Adult    => "adult",
            PassengerKind::Student  => "student",
            PassengerKind::Disabled => "disabled",
            PassengerKind::Child    => "child",
            PassengerKind::Senior   => "senior",
        }
    }
}

impl std::fmt::Display for PassengerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the trips a generated passenger makes during the day.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPattern {
    /// A single trip A → B.
    OneWay,
    /// A → B, later B → A.
    RoundTrip,
    /// A → B → C → A.
    Chain,
}

impl TripPattern {
    /// All patterns, in the order used by
    /// [`TripPatternProportions::weights`][crate::TripPatternProportions::weights].
    pub const ALL: [TripPattern; 3] = [TripPattern::OneWay, TripPattern::RoundTrip, TripPattern::Chain];

    /// Number of trips the pattern produces.
    pub fn trip_count(self) -> usize {
        match self {
            TripPattern::OneWay    => 1,
            TripPattern::RoundTrip => 2,
            TripPattern::Chain     => 3,
        }
    }
}
