pub mod meter;

use serde::Serialize;

/// Characters counted as symbols.
pub const SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>_-+=[]\\/~`";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Middle,
    High,
}

impl Tier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::High,
            60..=79 => Self::Middle,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Middle => "middle",
            Self::High => "high",
        }
    }

    pub fn passes(self) -> bool {
        !matches!(self, Self::Low)
    }

    /// Bootstrap contextual color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "danger",
            Self::Middle => "warning",
            Self::High => "success",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Low => "Strength: low (does not meet requirements)",
            Self::Middle => "Strength: medium (acceptable)",
            Self::High => "Strength: high",
        }
    }
}

/// Base conditions met, one flag per checklist entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Checks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub score: u8,
    pub tier: Tier,
    pub valid: bool,
    pub checks: Checks,
    pub message: &'static str,
}

impl Verdict {
    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}

pub const EMPTY_MESSAGE: &str = "Please enter a password";

/// Raw points can reach 125; the reported score is capped.
pub const MAX_SCORE: u8 = 100;

#[derive(Default)]
struct ClassCounts {
    upper: usize,
    lower: usize,
    digit: usize,
    symbol: usize,
    total: usize,
}

fn count_classes(password: &str) -> ClassCounts {
    password.chars().fold(ClassCounts::default(), |mut c, ch| {
        c.total += 1;
        if ch.is_ascii_uppercase() {
            c.upper += 1;
        } else if ch.is_ascii_lowercase() {
            c.lower += 1;
        } else if ch.is_ascii_digit() {
            c.digit += 1;
        } else if SYMBOLS.contains(ch) {
            c.symbol += 1;
        }
        c
    })
}

fn class_points(count: usize, bonus: u8) -> u8 {
    match count {
        0 => 0,
        1 => 15,
        _ => 15 + bonus,
    }
}

/// Scores a password. Pure and cheap enough to run on every keystroke.
pub fn evaluate(password: &str) -> Verdict {
    if password.is_empty() {
        return Verdict {
            score: 0,
            tier: Tier::Low,
            valid: false,
            checks: Checks::default(),
            message: EMPTY_MESSAGE,
        };
    }

    let c = count_classes(password);
    let mut score = 0u8;
    if c.total >= 8 {
        score += 20;
    }
    if c.total >= 12 {
        score += 10;
    }
    if c.total >= 16 {
        score += 10;
    }
    score += class_points(c.upper, 5);
    score += class_points(c.lower, 5);
    score += class_points(c.digit, 5);
    score += class_points(c.symbol, 10);
    let score = score.min(MAX_SCORE);

    let tier = Tier::from_score(score);
    Verdict {
        score,
        tier,
        valid: tier.passes(),
        checks: Checks {
            length: c.total >= 8,
            uppercase: c.upper > 0,
            lowercase: c.lower > 0,
            digit: c.digit > 0,
            special: c.symbol > 0,
        },
        message: tier.message(),
    }
}
