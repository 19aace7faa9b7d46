//! Property checks for rule matching and capacity accounting.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use desk_engine::domain::aggregates::NewTicket;
use desk_engine::domain::services::RuleMatcher;
use desk_engine::{
    AgentConfig, AgentId, AssignmentRule, Condition, CreateTicketCommand, CustomerContact, Email, EngineConfig,
    HelpdeskEngine, Priority, RoutingAdmin, RuleId, SlaBudget, Ticket, TicketField, TicketId, TicketUseCases,
    UpdateStatusCommand,
};

const CATEGORIES: [&str; 3] = ["Billing", "Technical Support", "Sales"];

fn ticket(category: &str) -> Ticket {
    Ticket::create(
        TicketId::new(1),
        NewTicket {
            title: "t".into(),
            description: None,
            category: Some(category.into()),
            priority: Priority::High,
            customer: CustomerContact::new(None, Email::new("c@x.io").unwrap()),
        },
        SlaBudget::from_hours(2, 8).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
}

fn rules_strategy() -> impl Strategy<Value = Vec<AssignmentRule>> {
    prop::collection::vec((0u32..20, 0usize..3, any::<bool>()), 0..8).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (priority, cat, active))| {
                let rule = AssignmentRule::new(
                    RuleId::new(format!("rule_{i}")).unwrap(),
                    "generated",
                    priority,
                    Condition::equals(TicketField::Category, CATEGORIES[cat]),
                    AgentId::new("agent_1").unwrap(),
                );
                if active { rule } else { rule.inactive() }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn matcher_picks_lowest_active_match_in_any_order(rules in rules_strategy(), cat in 0usize..3, seed in any::<u64>()) {
        let t = ticket(CATEGORIES[cat]);
        let expected = rules
            .iter()
            .filter(|r| r.active && r.condition.evaluate(&t))
            .map(|r| (r.priority, r.id.clone()))
            .min();

        let mut shuffled = rules.clone();
        let n = shuffled.len();
        if n > 1 {
            shuffled.rotate_left((seed as usize) % n);
            shuffled.reverse();
        }

        let got = RuleMatcher::find_match(&t, &shuffled).map(|r| (r.priority, r.id.clone()));
        prop_assert_eq!(got, expected);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Create(usize),
    Resolve(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3).prop_map(Op::Create),
        1 => (0usize..64).prop_map(Op::Resolve),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn capacity_never_exceeded(
        caps in prop::collection::vec(0u32..4, 1..4),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let agents = caps
            .iter()
            .enumerate()
            .map(|(i, cap)| AgentConfig {
                id: AgentId::new(format!("agent_{i}")).unwrap(),
                name: format!("Agent {i}"),
                email: None,
                department: None,
                specialties: vec![CATEGORIES[i % 3].to_string()],
                active: true,
                max_tickets: *cap,
                current_tickets: 0,
            })
            .collect();
        let config = EngineConfig { agents, ..EngineConfig::default() };
        let engine = HelpdeskEngine::in_memory(&config).unwrap();
        let mut created = Vec::new();

        for op in ops {
            match op {
                Op::Create(cat) => {
                    let view = engine.create_ticket(CreateTicketCommand {
                        title: "load".into(),
                        category: Some(CATEGORIES[cat].into()),
                        priority: "medium".into(),
                        customer_email: "c@x.io".into(),
                        ..Default::default()
                    }).unwrap();
                    created.push(view.display_id);
                }
                Op::Resolve(i) if !created.is_empty() => {
                    let id = created[i % created.len()].clone();
                    // illegal moves on already-resolved tickets are expected and ignored
                    let _ = engine.update_status(UpdateStatusCommand { ticket_id: id.clone(), status: "in_progress".into() });
                    let _ = engine.update_status(UpdateStatusCommand { ticket_id: id, status: "resolved".into() });
                }
                Op::Resolve(_) => {}
            }

            for agent in engine.list_agents().unwrap() {
                prop_assert!(agent.current_tickets() <= agent.max_tickets());
            }
        }

        // every open slot belongs to exactly one unresolved ticket
        let tickets = engine.list_tickets(&Default::default()).unwrap();
        for agent in engine.list_agents().unwrap() {
            let open = tickets
                .iter()
                .filter(|v| v.ticket.assigned_agent() == Some(agent.id()) && !v.ticket.status().is_terminal())
                .count();
            prop_assert_eq!(open as u32, agent.current_tickets());
        }
    }
}
