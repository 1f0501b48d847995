//! Demo request generators for the roster optimizer.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{AvailabilityType, AvailabilityWindow, Employee, OpenShift, Settings};
use crate::dto::OptimizeRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
    Understaffed,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            "UNDERSTAFFED" => Ok(DemoData::Understaffed),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
            DemoData::Understaffed => "UNDERSTAFFED",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                skills: vec!["skill_cashier", "skill_stock"],
                untrained_skills: vec![],
                days_in_schedule: 3,
                employee_count: 8,
                skill_count_distribution: vec![(1, 3.0), (2, 1.0)],
                shift_count_distribution: vec![(1, 0.7), (2, 0.3)],
                availability_distribution: vec![
                    (None, 3.0),
                    (Some(AvailabilityType::Preferred), 3.0),
                    (Some(AvailabilityType::Neutral), 2.0),
                    (Some(AvailabilityType::Avoided), 1.0),
                    (Some(AvailabilityType::Blackout), 1.0),
                ],
            },
            DemoData::Large => DemoDataParameters {
                skills: vec!["skill_cashier", "skill_stock", "skill_forklift", "skill_barista"],
                untrained_skills: vec![],
                days_in_schedule: 7,
                employee_count: 20,
                skill_count_distribution: vec![(1, 3.0), (2, 2.0), (3, 1.0)],
                shift_count_distribution: vec![(1, 0.5), (2, 0.3), (3, 0.2)],
                availability_distribution: vec![
                    (None, 4.0),
                    (Some(AvailabilityType::Preferred), 3.0),
                    (Some(AvailabilityType::Neutral), 2.0),
                    (Some(AvailabilityType::Avoided), 1.0),
                    (Some(AvailabilityType::Blackout), 1.0),
                ],
            },
            DemoData::Understaffed => DemoDataParameters {
                skills: vec!["skill_cashier", "skill_stock"],
                untrained_skills: vec!["skill_pharmacist"],
                days_in_schedule: 3,
                employee_count: 3,
                skill_count_distribution: vec![(1, 1.0)],
                shift_count_distribution: vec![(2, 0.5), (3, 0.5)],
                availability_distribution: vec![
                    (Some(AvailabilityType::Neutral), 2.0),
                    (Some(AvailabilityType::Avoided), 2.0),
                    (Some(AvailabilityType::Blackout), 1.0),
                ],
            },
        }
    }
}

struct DemoDataParameters {
    skills: Vec<&'static str>,
    /// Required by some shifts, held by no employee.
    untrained_skills: Vec<&'static str>,
    days_in_schedule: i64,
    employee_count: usize,
    skill_count_distribution: Vec<(usize, f64)>,
    shift_count_distribution: Vec<(usize, f64)>,
    /// Per employee and day: the kind of full-day window, if any.
    availability_distribution: Vec<(Option<AvailabilityType>, f64)>,
}

/// Shift templates: code, start hour, length in hours.
const SHIFT_TEMPLATES: &[(&str, u32, u32)] = &[
    ("shift_morning", 6, 6),
    ("shift_midday", 10, 6),
    ("shift_evening", 14, 8),
];

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE", "UNDERSTAFFED"]
}

/// Generates a demo optimize request.
pub fn generate(demo: DemoData) -> OptimizeRequest {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(0);

    let start_date = find_next_monday(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap_or_default());
    let end_date = start_date + Duration::days(params.days_in_schedule - 1);

    let ids = generate_employee_ids(&mut rng);

    let mut employees = Vec::with_capacity(params.employee_count);
    for i in 0..params.employee_count {
        let skill_count = pick_weighted(&mut rng, &params.skill_count_distribution).unwrap_or(1);
        let skills: Vec<&str> = params
            .skills
            .choose_multiple(&mut rng, skill_count.min(params.skills.len()))
            .copied()
            .collect();

        let mut employee = Employee::new(ids[i % ids.len()].clone()).with_skills(skills);

        // Most employees lean one way on at least one shift code
        if rng.gen_bool(0.6) {
            if let Some(&(code, _, _)) = SHIFT_TEMPLATES.choose(&mut rng) {
                employee = employee.with_preference(code, rng.gen_range(-5..=5));
            }
        }

        for day in 0..params.days_in_schedule {
            let date = start_date + Duration::days(day);
            let kind = pick_weighted(&mut rng, &params.availability_distribution).flatten();
            if let Some(kind) = kind {
                let start = date.and_time(NaiveTime::MIN);
                let end = start + Duration::hours(24);
                employee = employee.with_window(AvailabilityWindow::new(start, end, kind));
            }
        }

        employees.push(employee);
    }

    let mut open_shifts = Vec::new();
    let mut shift_id = 0usize;
    for day in 0..params.days_in_schedule {
        let date = start_date + Duration::days(day);

        for &(code, start_hour, hours) in SHIFT_TEMPLATES {
            let shift_count = pick_weighted(&mut rng, &params.shift_count_distribution).unwrap_or(1);

            for _ in 0..shift_count {
                let required_skill = if !params.untrained_skills.is_empty() && rng.gen_bool(0.2) {
                    params.untrained_skills.choose(&mut rng)
                } else {
                    params.skills.choose(&mut rng)
                }
                .copied()
                .unwrap_or("skill_cashier");

                let start = time(start_hour, 0);
                let end = time((start_hour + hours) % 24, 0);
                open_shifts.push(
                    OpenShift::new(format!("shift-{shift_id}"), date, code, f64::from(hours))
                        .with_required_skills([required_skill])
                        .with_times(start, end),
                );
                shift_id += 1;
            }
        }
    }

    OptimizeRequest {
        team_id: format!("demo-{}", demo.as_str().to_lowercase()),
        date_from: start_date,
        date_to: end_date,
        employees,
        open_shifts,
        settings: Settings::default(),
    }
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn find_next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = match date.weekday() {
        Weekday::Mon => 0,
        Weekday::Tue => 6,
        Weekday::Wed => 5,
        Weekday::Thu => 4,
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        Weekday::Sun => 1,
    };
    date + Duration::days(days_until_monday)
}

/// Pick a value based on weighted distribution.
fn pick_weighted<T: Copy>(rng: &mut StdRng, distribution: &[(T, f64)]) -> Option<T> {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;

    for (value, weight) in distribution {
        if choice < *weight {
            return Some(*value);
        }
        choice -= weight;
    }
    distribution.last().map(|(value, _)| *value)
}

const FIRST_NAMES: &[&str] = &[
    "amy", "beth", "carl", "dan", "elsa", "flo", "gus", "hugo", "ivy", "jay",
];
const LAST_NAMES: &[&str] = &[
    "cole", "fox", "green", "jones", "king", "li", "poe", "rye", "smith", "watt",
];

fn generate_employee_ids(rng: &mut StdRng) -> Vec<String> {
    let mut ids = Vec::with_capacity(FIRST_NAMES.len() * LAST_NAMES.len());
    for first in FIRST_NAMES {
        for last in LAST_NAMES {
            ids.push(format!("emp-{}-{}", first, last));
        }
    }
    ids.shuffle(rng);
    ids
}
