//! Property tests for occupancy serialization, time-off merging and
//! feasibility monotonicity.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use pto_engine::models::{Department, Person, Role, Task, TaskStatus, TimeOffMap};
use pto_engine::scheduling::{OccupancyStore, StaffingContext, evaluate_staffing, merge};

const PEOPLE: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..31).prop_map(|offset| base_date() + Duration::days(offset))
}

fn person_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(PEOPLE.to_vec()).prop_map(str::to_string)
}

fn time_off_strategy() -> impl Strategy<Value = TimeOffMap> {
    prop::collection::vec((person_strategy(), date_strategy()), 0..20).prop_map(|pairs| {
        let mut map = TimeOffMap::new();
        for (person_id, date) in pairs {
            map.entry(date).or_default().insert(person_id);
        }
        map
    })
}

fn occupancy_strategy() -> impl Strategy<Value = OccupancyStore> {
    prop::collection::vec((person_strategy(), date_strategy()), 0..40).prop_map(|pairs| {
        let mut store = OccupancyStore::create_empty();
        for (person_id, date) in pairs {
            store.mark_occupied(&person_id, date);
        }
        store
    })
}

struct Fixture {
    people: Vec<Person>,
    departments: Vec<Department>,
    tasks: Vec<Task>,
}

fn fixture(min_staffing_level: u32) -> Fixture {
    let people = PEOPLE
        .iter()
        .enumerate()
        .map(|(i, id)| Person {
            id: id.to_string(),
            name: id.to_uppercase(),
            role: Role::Employee,
            department_id: "ops".to_string(),
            job_title: String::new(),
            skills: if i % 2 == 0 {
                BTreeSet::from(["oncall".to_string()])
            } else {
                BTreeSet::new()
            },
            level: 1,
            manager_id: None,
        })
        .collect();

    let departments = vec![Department {
        id: "ops".to_string(),
        name: "Operations".to_string(),
        manager_id: None,
        critical_skills: BTreeSet::from(["oncall".to_string()]),
        min_staffing_level,
    }];

    let tasks = vec![Task {
        id: "t1".to_string(),
        department_id: "ops".to_string(),
        assigned_to: PEOPLE.iter().map(|id| id.to_string()).collect(),
        required_skills: BTreeSet::new(),
        priority: 1,
        start_date: base_date(),
        end_date: base_date() + Duration::days(30),
        status: TaskStatus::Active,
    }];

    Fixture {
        people,
        departments,
        tasks,
    }
}

proptest! {
    #[test]
    fn prop_occupancy_round_trip(store in occupancy_strategy()) {
        let text = store.serialize().unwrap();
        let parsed = OccupancyStore::parse(&text).unwrap();
        for person_id in PEOPLE {
            prop_assert_eq!(parsed.occupied_dates(person_id), store.occupied_dates(person_id));
        }
        prop_assert_eq!(parsed.serialize().unwrap(), text);
    }

    #[test]
    fn prop_occupancy_mapping_matches_text(store in occupancy_strategy()) {
        let mapping: BTreeMap<String, Vec<String>> = store.to_mapping();
        let from_mapping = OccupancyStore::from_input(mapping).unwrap();
        prop_assert_eq!(from_mapping, store);
    }

    #[test]
    fn prop_merge_is_idempotent(a in time_off_strategy()) {
        prop_assert_eq!(merge(&a, &a), a);
    }

    #[test]
    fn prop_merge_with_empty_is_identity(a in time_off_strategy()) {
        prop_assert_eq!(merge(&a, &TimeOffMap::new()), a.clone());
        prop_assert_eq!(merge(&TimeOffMap::new(), &a), a);
    }

    #[test]
    fn prop_merge_is_commutative(a in time_off_strategy(), b in time_off_strategy()) {
        prop_assert_eq!(merge(&a, &b), merge(&b, &a));
    }

    #[test]
    fn prop_merge_of_disjoint_dates_is_union(a in time_off_strategy(), b in time_off_strategy()) {
        let b: TimeOffMap = b.into_iter().filter(|(date, _)| !a.contains_key(date)).collect();
        let mut union = a.clone();
        union.extend(b.clone());
        prop_assert_eq!(merge(&a, &b), union);
    }

    #[test]
    fn prop_merge_never_double_counts(a in time_off_strategy(), b in time_off_strategy()) {
        let merged = merge(&a, &b);
        for (date, people) in &merged {
            let expected: BTreeSet<&String> = a
                .get(date)
                .into_iter()
                .chain(b.get(date))
                .flatten()
                .collect();
            prop_assert_eq!(people.len(), expected.len());
        }
    }

    #[test]
    fn prop_feasibility_is_monotonic(
        min in 0u32..5,
        time_off in time_off_strategy(),
        extra_person in person_strategy(),
        extra_date in date_strategy(),
    ) {
        let fixture = fixture(min);
        let ctx = StaffingContext {
            people: &fixture.people,
            departments: &fixture.departments,
            tasks: &fixture.tasks,
        };
        let start = base_date();
        let end = base_date() + Duration::days(30);

        let before = evaluate_staffing(ctx, &time_off, start, end);

        let mut more = time_off.clone();
        more.entry(extra_date).or_default().insert(extra_person);
        let after = evaluate_staffing(ctx, &more, start, end);

        if !before.feasible {
            prop_assert!(!after.feasible);
        }
        for violation in &before.violations {
            let still_violated = after.violations.iter().any(|v| {
                v.date == violation.date
                    && v.department_id == violation.department_id
                    && std::mem::discriminant(&v.reason) == std::mem::discriminant(&violation.reason)
            });
            prop_assert!(still_violated);
        }
        prop_assert!(after.violations.len() >= before.violations.len());
    }
}
