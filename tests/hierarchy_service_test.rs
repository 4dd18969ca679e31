//! Tests for HierarchyService: forest construction and rendering

use rstest::{fixture, rstest};

use hris_forest::application::services::HierarchyService;
use hris_forest::application::ApplicationError;
use hris_forest::domain::builder::ForestBuilder;
use hris_forest::domain::entities::{Employee, Group};
use hris_forest::domain::render::ForestSummary;
use hris_forest::domain::DomainError;
use hris_forest::util::testing;

#[fixture]
fn service() -> HierarchyService {
    testing::init_test_setup();
    HierarchyService::default()
}

fn group(id: &str, name: &str, parent: Option<&str>, group_type: Option<&str>) -> Group {
    Group {
        id: id.into(),
        name: Some(name.into()),
        parent_group: parent.map(Into::into),
        group_type: group_type.map(Into::into),
        ..Default::default()
    }
}

fn employee(id: &str, full_name: &str, manager: Option<&str>) -> Employee {
    Employee {
        id: id.into(),
        display_full_name: Some(full_name.into()),
        manager: manager.map(Into::into),
        ..Default::default()
    }
}

fn org() -> Vec<Group> {
    vec![
        group("eng", "Engineering", None, Some("DEPARTMENT")),
        group("ops", "Operations", None, Some("DEPARTMENT")),
        group("plat", "Platform", Some("eng"), Some("TEAM")),
        group("db", "Databases", Some("plat"), Some("TEAM")),
        group("net", "Networking", Some("plat"), Some("TEAM")),
        group("sre", "SRE", Some("ops"), Some("TEAM")),
        group("lost", "Orphan", Some("gone"), Some("TEAM")),
        group("cc", "Cost Center 7", None, None),
    ]
}

#[rstest]
fn given_unknown_parent_when_building_then_team_has_two_roots(service: HierarchyService) {
    let groups = vec![
        group("A", "A", None, Some("TEAM")),
        group("B", "B", Some("A"), Some("TEAM")),
        group("C", "C", Some("X"), Some("TEAM")),
    ];

    let partitions = service.group_forests(&groups, &[]).unwrap();

    let team = &partitions["TEAM"];
    let summary = ForestSummary::of(team);
    assert_eq!(summary.root_count, 2);
    assert_eq!(summary.node_count, 3);
}

#[rstest]
fn given_mixed_types_when_building_then_every_group_lands_in_exactly_one_partition(
    service: HierarchyService,
) {
    let groups = org();

    let partitions = service.group_forests(&groups, &[]).unwrap();

    let total: usize = partitions
        .values()
        .map(|forest| ForestSummary::of(forest).node_count)
        .sum();
    assert_eq!(total, groups.len());
    assert_eq!(
        partitions.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["DEPARTMENT", "TEAM", "UNKNOWN"]
    );
    // plat and sre point at departments, lost at nothing
    assert_eq!(partitions["TEAM"].roots().len(), 3);
}

#[rstest]
fn given_mixed_types_when_rendering_then_prints_sections_with_summaries(
    service: HierarchyService,
) {
    let partitions = service.group_forests(&org(), &[]).unwrap();

    let rendered = service.render_groups(&partitions);

    let expected = "\
== DEPARTMENT ==
Engineering [eng]

Operations [ops]
Roots: 2, Total groups: 2

== TEAM ==
Platform [plat]
├── Databases [db]
└── Networking [net]

SRE [sre]

Orphan [lost]
Roots: 3, Total groups: 5

== UNKNOWN ==
Cost Center 7 [cc]
Roots: 1, Total groups: 1
";
    assert_eq!(rendered, expected);
}

#[rstest]
fn given_same_input_when_rendering_twice_then_output_is_identical(service: HierarchyService) {
    let first = service.render_groups(&service.group_forests(&org(), &[]).unwrap());
    let second = service.render_groups(&service.group_forests(&org(), &[]).unwrap());
    assert_eq!(first, second);
}

#[rstest]
fn given_custom_unknown_partition_when_building_then_uses_it() {
    let service = HierarchyService::new(ForestBuilder::new().with_unknown_partition("UNTYPED"));

    let partitions = service.group_forests(&org(), &[]).unwrap();

    assert!(partitions.contains_key("UNTYPED"));
    assert!(!partitions.contains_key("UNKNOWN"));
}

#[rstest]
fn given_reporting_lines_when_rendering_then_tags_managers(service: HierarchyService) {
    let employees = vec![
        employee("ceo", "Ada Lovelace", None),
        employee("cto", "Grace Hopper", Some("ceo")),
        employee("dev", "Alan Turing", Some("cto")),
        employee("cfo", "Edsger Dijkstra", Some("ceo")),
        employee("ext", "Barbara Liskov", Some("someone-else")),
    ];

    let forest = service.employee_forest(&employees).unwrap();
    let rendered = service.render_employees(&forest);

    let expected = "\
Ada Lovelace [Manager] [ceo]
├── Grace Hopper [Manager] [cto]
│   └── Alan Turing [dev]
└── Edsger Dijkstra [cfo]

Barbara Liskov [ext]
Roots: 2, Total employees: 5
";
    assert_eq!(rendered, expected);
}

#[rstest]
fn given_no_employees_when_rendering_then_prints_placeholder(service: HierarchyService) {
    let forest = service.employee_forest(&[]).unwrap();
    assert_eq!(
        service.render_employees(&forest),
        "(No employees)\nRoots: 0, Total employees: 0\n"
    );
}

#[rstest]
fn given_manager_cycle_when_building_then_returns_cycle_error(service: HierarchyService) {
    let employees = vec![
        employee("A", "A", Some("B")),
        employee("B", "B", Some("A")),
    ];

    let err = service.employee_forest(&employees).unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::CycleDetected { path, .. }) => {
            assert_eq!(path, vec!["A", "B", "A"]);
        }
        other => panic!("expected cycle error, got {other}"),
    }
}

#[rstest]
fn given_deep_chain_when_rendering_then_indents_every_level(service: HierarchyService) {
    let depth = 1_000;
    let mut employees = vec![employee("e0", "Root", None)];
    for i in 1..depth {
        employees.push(employee(
            &format!("e{i}"),
            &format!("Level {i}"),
            Some(&format!("e{}", i - 1)),
        ));
    }

    let forest = service.employee_forest(&employees).unwrap();
    let rendered = service.render_employees(&forest);

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), depth + 1);
    assert_eq!(lines[0], "Root [Manager] [e0]");
    assert_eq!(lines[1], "└── Level 1 [Manager] [e1]");
    assert_eq!(lines[2], "    └── Level 2 [Manager] [e2]");
    assert!(lines[depth - 1].ends_with("└── Level 999 [e999]"));
    assert_eq!(lines[depth], "Roots: 1, Total employees: 1000");
}
