use chrono::{TimeZone, Utc};
use hospitality_allocation_optimizer::{
    auto_fill, Allocation, AllocationError, CancellationCase, CaseStatus, Group, Guest, GuestId,
    PolicyType, Room, RoomId, Scenario,
};

fn guest(id: &str) -> GuestId {
    GuestId::from(id)
}

fn room(id: &str) -> RoomId {
    RoomId::from(id)
}

fn assert_within_capacity(allocation: &Allocation) {
    for utilisation in allocation.ledger().utilisation() {
        assert!(
            utilisation.occupancy <= utilisation.max_capacity,
            "{utilisation:?}"
        );
    }
    let mut seen = Vec::new();
    for guest_id in allocation.groups().iter().flat_map(|group| &group.guest_ids) {
        assert!(!seen.contains(&guest_id), "{guest_id} placed twice");
        seen.push(guest_id);
    }
}

#[test]
fn full_room_refuses_additional_guest() -> Result<(), AllocationError> {
    let mut allocation = Allocation::new(
        vec![Guest::new("couple", "Couple", 2), Guest::new("single", "Single", 1)],
        vec![Room::new("201", 2, PolicyType::Flexible)],
    )?;
    allocation.assign(&guest("couple"), Some(&room("201")))?;
    assert_eq!(allocation.ledger().occupancy_of(&room("201")), 2);

    let result = allocation.assign(&guest("single"), Some(&room("201")));
    assert_eq!(
        result,
        Err(AllocationError::CapacityExceeded {
            room_id: room("201"),
            attempted: 3,
            capacity: 2,
        })
    );
    assert_eq!(allocation.ledger().occupancy_of(&room("201")), 2);
    assert_within_capacity(&allocation);
    Ok(())
}

#[test]
fn first_fit_descending_placement() -> Result<(), AllocationError> {
    let guests = vec![
        Guest::new("three", "Family of three", 3),
        Guest::new("two-a", "First couple", 2),
        Guest::new("two-b", "Second couple", 2),
        Guest::new("one", "Single", 1),
    ];
    let rooms = vec![
        Room::new("cap-2-first", 2, PolicyType::Flexible),
        Room::new("cap-3", 3, PolicyType::Flexible),
        Room::new("cap-2-second", 2, PolicyType::Flexible),
    ];

    let groups = auto_fill(&guests, &rooms, &[], &guests);
    assert_eq!(
        groups,
        [
            Group {
                room_id: room("cap-3"),
                guest_ids: vec![guest("three")],
            },
            Group {
                room_id: room("cap-2-first"),
                guest_ids: vec![guest("two-a")],
            },
            Group {
                room_id: room("cap-2-second"),
                guest_ids: vec![guest("two-b")],
            },
        ]
    );

    let mut allocation = Allocation::new(guests, rooms)?;
    let report = allocation.auto_fill();
    assert_eq!(report.unassigned, [guest("one")]);
    assert_eq!(allocation.groups(), groups.as_slice());
    assert_within_capacity(&allocation);
    Ok(())
}

#[test]
fn rescue_swap_avoids_penalty() -> Result<(), AllocationError> {
    let mut allocation = Allocation::with_groups(
        vec![
            Guest::new("flex", "Aarav Mehta", 2),
            Guest::new("locked", "Priya Nair", 1),
        ],
        vec![
            Room::new("302", 2, PolicyType::NonRefundable),
            Room::new("405", 2, PolicyType::Flexible),
            Room::new("501", 2, PolicyType::NonRefundable),
        ],
        vec![
            Group {
                room_id: room("405"),
                guest_ids: vec![guest("flex")],
            },
            Group {
                room_id: room("501"),
                guest_ids: vec![guest("locked")],
            },
        ],
    )?;
    let created = Utc.with_ymd_and_hms(2026, 2, 10, 9, 30, 0).unwrap();
    let mut case = CancellationCase::new(
        "c1",
        "302",
        "Verma",
        12_500,
        PolicyType::NonRefundable,
        created,
    );

    let candidates = allocation.rescue_candidates(&case);
    let proposals = allocation.propose_rescue(&case, &candidates)?;
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].guest_id, guest("flex"));
    assert_eq!(proposals[0].current_room_id, room("405"));

    let approved_at = Utc.with_ymd_and_hms(2026, 2, 11, 14, 0, 0).unwrap();
    let outcome = allocation.confirm_swap(&mut case, &guest("flex"), approved_at)?;
    assert_eq!(outcome.from_room, Some(room("405")));
    assert_eq!(outcome.penalty_saved, 12_500);
    assert_eq!(case.status, CaseStatus::Approved);
    assert_eq!(
        case.approved_action.as_deref(),
        Some("Room swap: Aarav Mehta moved to Room 302")
    );
    assert_eq!(case.approved_date, Some(approved_at));
    assert_eq!(allocation.room_of(&guest("flex")), Some(&room("302")));
    assert_eq!(allocation.group_of(&room("405")), None);
    assert_eq!(allocation.ledger().occupancy_of(&room("405")), 0);
    assert_within_capacity(&allocation);
    Ok(())
}

#[test]
fn emptied_group_is_pruned() -> Result<(), AllocationError> {
    let mut allocation = Allocation::new(
        vec![Guest::new("a", "A", 1), Guest::new("b", "B", 1)],
        vec![Room::new("10", 2, PolicyType::Flexible)],
    )?;
    allocation.assign(&guest("a"), Some(&room("10")))?;
    allocation.assign(&guest("b"), Some(&room("10")))?;
    allocation.assign(&guest("a"), None)?;
    assert_eq!(
        allocation.group_of(&room("10")).map(|group| group.guest_ids.clone()),
        Some(vec![guest("b")])
    );
    allocation.assign(&guest("b"), None)?;
    assert!(allocation.groups().is_empty());
    assert_eq!(allocation.group_of(&room("10")), None);
    assert_eq!(allocation.ledger().occupancy_of(&room("10")), 0);
    Ok(())
}

#[test]
fn arbitrary_move_sequence_keeps_invariants() -> Result<(), AllocationError> {
    let guests: Vec<Guest> = (1..=8)
        .map(|index| Guest::new(format!("g{index}"), format!("Guest {index}"), index % 3 + 1))
        .collect();
    let rooms = vec![
        Room::new("r1", 3, PolicyType::Flexible),
        Room::new("r2", 4, PolicyType::Refundable),
        Room::new("r3", 2, PolicyType::NonRefundable),
    ];
    let mut allocation = Allocation::new(guests, rooms)?;
    let targets = [Some("r1"), Some("r2"), Some("r3"), None];
    for step in 0..64_usize {
        let guest_id = guest(&format!("g{}", step % 8 + 1));
        let target = targets[(step * 7) % targets.len()].map(room);
        let before = allocation.clone();
        match allocation.assign(&guest_id, target.as_ref()) {
            Ok(()) => {}
            Err(AllocationError::CapacityExceeded { .. }) => assert_eq!(allocation, before),
            Err(other) => return Err(other),
        }
        assert_within_capacity(&allocation);
        assert!(allocation
            .groups()
            .iter()
            .all(|group| !group.guest_ids.is_empty()));
    }
    Ok(())
}

#[test]
fn scenario_fixture_runs_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let scenario: Scenario = serde_json::from_str(include_str!("fixtures/wedding.json"))?;
    let outcome = scenario.run(true)?;

    for utilisation in &outcome.utilisation {
        assert!(utilisation.occupancy <= utilisation.max_capacity);
    }
    let report = outcome.auto_fill.ok_or("auto-fill did not run")?;
    // 410 takes the Kapoor family, 302 the Iyer couple and 410 the last single
    assert_eq!(
        report.placed,
        [
            (guest("g3"), room("410")),
            (guest("g5"), room("302")),
            (guest("g4"), room("410")),
        ]
    );
    assert!(report.unassigned.is_empty());

    // only the open cancellation is considered
    assert_eq!(outcome.rescues.len(), 1);
    let rescue = &outcome.rescues[0];
    assert_eq!(rescue.penalty_amount, 12_500);
    let proposed: Vec<&GuestId> = rescue
        .candidates
        .iter()
        .map(|candidate| &candidate.guest_id)
        .collect();
    assert_eq!(proposed, [&guest("g1"), &guest("g3"), &guest("g4")]);
    Ok(())
}
