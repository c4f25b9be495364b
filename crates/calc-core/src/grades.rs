//! GPA, assignment grade and weighted grade calculators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::{fmt, format_number};
use crate::step::{Solution, Step};
use crate::validation::{require_finite, NumberRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GpaScale {
    #[default]
    #[serde(rename = "4.0")]
    Four,
    #[serde(rename = "5.0")]
    Five,
}

impl GpaScale {
    pub fn max_points(self) -> f64 {
        match self {
            Self::Four => 4.0,
            Self::Five => 5.0,
        }
    }
}

impl fmt::Display for GpaScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Four => write!(f, "4.0"),
            Self::Five => write!(f, "5.0"),
        }
    }
}

impl std::str::FromStr for GpaScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" | "4.0" => Ok(Self::Four),
            "5" | "5.0" => Ok(Self::Five),
            _ => Err(format!("invalid GPA scale: {s}")),
        }
    }
}

/// Grade points for a letter grade; the 5.0 scale adds one point to every
/// passing grade.
pub fn letter_points(letter: &str, scale: GpaScale) -> CalcResult<f64> {
    let base = match letter.trim().to_uppercase().as_str() {
        "A+" | "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "D-" => 0.7,
        "F" => return Ok(0.0),
        _ => return Err(CalcError::Validation(format!("unknown letter grade: {letter}"))),
    };
    Ok(match scale {
        GpaScale::Four => base,
        GpaScale::Five => base + 1.0,
    })
}

/// Letter for a percentage: 90/80/70/60 cut-offs.
pub fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A"
    } else if percentage >= 80.0 {
        "B"
    } else if percentage >= 70.0 {
        "C"
    } else if percentage >= 60.0 {
        "D"
    } else {
        "F"
    }
}

// ---------------------------------------------------------------------------
// GPA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub name: String,
    pub grade: String,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePoints {
    pub name: String,
    pub grade: String,
    pub credits: f64,
    pub earned_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaOutcome {
    pub gpa: f64,
    pub scale: GpaScale,
    pub total_credits: f64,
    pub total_points: f64,
    pub courses: Vec<CoursePoints>,
}

pub fn gpa(courses: &[Course], scale: GpaScale) -> CalcResult<Solution<GpaOutcome>> {
    if courses.is_empty() {
        return Err(CalcError::validation(
            "Please enter at least one course with grade and credits",
        ));
    }
    let credit_rule = NumberRule {
        allow_zero: false,
        allow_negative: false,
        ..NumberRule::default()
    };

    let mut rows = Vec::with_capacity(courses.len());
    let mut steps = Vec::new();
    for course in courses {
        credit_rule.check(course.credits)?;
        let points = letter_points(&course.grade, scale)?;
        let earned = points * course.credits;
        steps.push(Step::new(
            if course.name.is_empty() { "Course" } else { course.name.as_str() },
            format!(
                "{} ({}) × {} credits = {} points",
                course.grade.trim().to_uppercase(),
                fmt(points),
                fmt(course.credits),
                fmt(earned)
            ),
        ));
        rows.push(CoursePoints {
            name: course.name.clone(),
            grade: course.grade.trim().to_uppercase(),
            credits: course.credits,
            earned_points: earned,
        });
    }

    let total_credits: f64 = rows.iter().map(|r| r.credits).sum();
    let total_points: f64 = rows.iter().map(|r| r.earned_points).sum();
    let gpa = total_points / total_credits;
    steps.push(Step::new(
        "GPA",
        format!(
            "{} points ÷ {} credits = {}",
            fmt(total_points),
            fmt(total_credits),
            format_number(gpa, 2)
        ),
    ));

    Ok(Solution::new(
        GpaOutcome {
            gpa,
            scale,
            total_credits,
            total_points,
            courses: rows,
        },
        steps,
    ))
}

// ---------------------------------------------------------------------------
// Assignment grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default)]
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    pub total_points: f64,
    pub total_max_points: f64,
    pub percentage: f64,
    pub letter_grade: String,
}

pub fn grade(assignments: &[Assignment]) -> CalcResult<Solution<GradeOutcome>> {
    if assignments.is_empty() {
        return Err(CalcError::validation(
            "Please enter at least one assignment with score and max score",
        ));
    }
    for a in assignments {
        require_finite("score", a.score)?;
        require_finite("max score", a.max_score)?;
        if a.score < 0.0 || a.max_score < 0.0 {
            return Err(CalcError::validation("Scores cannot be negative"));
        }
    }
    let total_points: f64 = assignments.iter().map(|a| a.score).sum();
    let total_max_points: f64 = assignments.iter().map(|a| a.max_score).sum();
    if total_max_points == 0.0 {
        return Err(CalcError::domain("total max score must be greater than zero"));
    }
    let percentage = total_points / total_max_points * 100.0;
    let letter = letter_grade(percentage);

    let steps = vec![
        Step::new("Total Points", format!("{} / {}", fmt(total_points), fmt(total_max_points))),
        Step::new(
            "Percentage",
            format!(
                "({} ÷ {}) × 100 = {}%",
                fmt(total_points),
                fmt(total_max_points),
                format_number(percentage, 2)
            ),
        ),
        Step::new("Letter Grade", letter),
    ];

    Ok(Solution::new(
        GradeOutcome {
            total_points,
            total_max_points,
            percentage,
            letter_grade: letter.to_string(),
        },
        steps,
    ))
}

// ---------------------------------------------------------------------------
// Weighted grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub name: String,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedGrade {
    pub final_grade: f64,
    pub total_weight: f64,
    pub letter_grade: String,
    pub categories: Vec<Contribution>,
}

/// Σ(score·weight) / Σweight. Weights need not add up to 100.
pub fn weighted_grade(categories: &[Category]) -> CalcResult<Solution<WeightedGrade>> {
    if categories.is_empty() {
        return Err(CalcError::validation(
            "Please enter at least one category with score and weight",
        ));
    }
    for c in categories {
        require_finite("score", c.score)?;
        require_finite("weight", c.weight)?;
        if c.weight < 0.0 {
            return Err(CalcError::validation("Weights cannot be negative"));
        }
    }
    let total_weight: f64 = categories.iter().map(|c| c.weight).sum();
    if total_weight == 0.0 {
        return Err(CalcError::domain("total weight must be greater than zero"));
    }
    let weighted_sum: f64 = categories.iter().map(|c| c.score * c.weight).sum();
    let final_grade = weighted_sum / total_weight;
    let letter = letter_grade(final_grade);

    let contributions: Vec<Contribution> = categories
        .iter()
        .map(|c| Contribution {
            name: c.name.clone(),
            score: c.score,
            weight: c.weight,
            contribution: c.score * c.weight / total_weight,
        })
        .collect();

    let mut steps: Vec<Step> = contributions
        .iter()
        .map(|c| {
            Step::new(
                if c.name.is_empty() { "Category" } else { c.name.as_str() },
                format!(
                    "{}% × {}% weight = {}% contribution",
                    fmt(c.score),
                    fmt(c.weight),
                    format_number(c.contribution, 2)
                ),
            )
        })
        .collect();
    steps.push(Step::new(
        "Final Grade",
        format!(
            "{} ÷ {} = {}% ({letter})",
            fmt(weighted_sum),
            fmt(total_weight),
            format_number(final_grade, 2)
        ),
    ));
    if (total_weight - 100.0).abs() > 1e-9 {
        steps.push(Step::new(
            "Note",
            format!("weights add up to {}%, result is normalized", fmt(total_weight)),
        ));
    }

    Ok(Solution::new(
        WeightedGrade {
            final_grade,
            total_weight,
            letter_grade: letter.to_string(),
            categories: contributions,
        },
        steps,
    ))
}
