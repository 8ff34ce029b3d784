mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use common::*;
use thesis_advisor_core::{aggregate, DebateController, Persona, Round, RoundRecord};
use thesis_advisor_literature::{ConnectorKind, Library, ReferenceRecord};

fn opponent_marks(prompt: &str, opponent: Persona) -> Vec<u8> {
    (1..=5)
        .filter(|n| prompt.contains(&format!("{}-R{}", opponent, n)))
        .collect()
}

// ============================================================
// Context window
// ============================================================

#[tokio::test]
async fn test_persona_sees_only_previous_opponent_round() {
    let debater = ScriptedDebater::default();
    let (library, _, _) = library();
    let controller = DebateController::new(&debater, &library, logger());

    let run = controller.run(&brief()).await;
    assert!(!run.interrupted);
    assert_eq!(run.completed_rounds, 5);

    for persona in Persona::CANONICAL {
        for round in Round::ALL {
            let n = round.number();
            let prompt = debater.first_request(persona, n).prompt();

            let expected_opponent: Vec<u8> = match round {
                Round::Opening | Round::Closing => vec![],
                _ => vec![n - 1],
            };
            assert_eq!(
                opponent_marks(&prompt, persona.opponent()),
                expected_opponent,
                "{} in round {}",
                persona,
                n
            );

            let own: Vec<u8> = (1..=5)
                .filter(|k| prompt.contains(&format!("{}-R{}", persona, k)))
                .collect();
            assert_eq!(own, (1..n).collect::<Vec<_>>(), "{} own history in round {}", persona, n);
        }
    }
}

#[tokio::test]
async fn test_system_instruction_is_stable_across_rounds() {
    let debater = ScriptedDebater::default();
    let (library, _, _) = library();
    DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;

    let first = debater.first_request(Persona::Con, 1).system;
    for n in 2..=5 {
        assert_eq!(debater.first_request(Persona::Con, n).system, first);
    }
    assert!(!first.contains("PRO-R"));
}

// ============================================================
// Tool gating
// ============================================================

#[tokio::test]
async fn test_tool_declared_only_in_search_rounds() {
    let debater = ScriptedDebater {
        rogue_tool_calls: true,
        ..Default::default()
    };
    let (library, pubmed, scholar) = library();
    let run = DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;

    for persona in Persona::CANONICAL {
        for round in Round::ALL {
            let request = debater.first_request(persona, round.number());
            assert_eq!(request.has_tools(), round.search_enabled(), "round {}", round);
        }
    }

    let tool = &debater.first_request(Persona::Con, 5).tools[0];
    assert_eq!(tool.name, "search_literature");
    let source = &tool.parameters["properties"]["source"];
    assert_eq!(source["enum"], serde_json::json!(["pubmed", "scholar"]));
    assert!(source["description"].as_str().unwrap().starts_with("pubmed: Biomedical"));

    for record in &run.records {
        if !record.round.search_enabled() {
            assert!(record.new_references.is_empty());
            assert!(!record.used_search);
            assert!(!record.failed);
        }
    }
    // Rogue calls in gated rounds were never executed
    assert_eq!(pubmed.calls() + scholar.calls(), 0);
}

#[tokio::test]
async fn test_references_without_links_are_all_kept() {
    let mut debater = ScriptedDebater::default();
    debater
        .searches
        .insert((Persona::Pro, 3), vec![search_call("scholar", "organoid sentience")]);
    let pubmed = CountingConnector::new(ConnectorKind::PubMed, Vec::new());
    let scholar = CountingConnector::new(
        ConnectorKind::Scholar,
        vec![
            ReferenceRecord::new("Paper A", "Ito", "a", ""),
            ReferenceRecord::new("Paper B", "Ruiz", "b", ""),
            ReferenceRecord::new("Paper C", "Novak", "c", ""),
        ],
    );
    let library = Library::new(pubmed, scholar);
    let mut brief = brief();
    brief.references[0].link.clear();

    let run = DebateController::new(&debater, &library, logger())
        .run(&brief)
        .await;
    let transcript = aggregate(&run.records).unwrap();

    let deepen_pro = &transcript.records()[4];
    assert!(deepen_pro.used_search);
    let titles: Vec<&str> = deepen_pro
        .new_references
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(titles, ["Paper A", "Paper B", "Paper C"]);
}

#[tokio::test]
async fn test_search_round_fetches_new_references() {
    let mut debater = ScriptedDebater::default();
    debater
        .searches
        .insert((Persona::Pro, 3), vec![search_call("pubmed", "organoid consciousness")]);
    let (library, pubmed, scholar) = library();

    let run = DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;
    let transcript = aggregate(&run.records).unwrap();

    let deepen_pro = &transcript.records()[4];
    assert_eq!((deepen_pro.round, deepen_pro.persona), (Round::Deepen, Persona::Pro));
    assert!(deepen_pro.used_search);
    assert_eq!(deepen_pro.text, "PRO-R3");
    // The duplicate of the initial reference is dropped
    assert_eq!(deepen_pro.new_references.len(), 1);
    assert_eq!(deepen_pro.new_references[0].link, "https://pubmed.example/1");

    assert_eq!(pubmed.calls(), 1);
    assert_eq!(scholar.calls(), 0);
    assert_eq!(
        pubmed.queries.lock().unwrap().as_slice(),
        ["organoid consciousness".to_string()]
    );

    // Follow-up call carries the tool exchange and declares no tools
    let calls = debater.calls_for(Persona::Pro, 3);
    assert_eq!(calls.len(), 2);
    assert!(!calls[1].request.has_tools());
    assert_eq!(calls[1].request.messages.len(), 3);

    // Round 5 shows the fetched reference back to its owner only
    assert!(debater
        .first_request(Persona::Pro, 5)
        .prompt()
        .contains("Organoid ethics review"));
    assert!(!debater
        .first_request(Persona::Con, 5)
        .prompt()
        .contains("Organoid ethics review"));
}

#[tokio::test]
async fn test_search_calls_capped_per_turn() {
    let mut debater = ScriptedDebater::default();
    debater.searches.insert(
        (Persona::Con, 5),
        vec![
            search_call("pubmed", "one"),
            search_call("scholar", "two"),
            search_call("pubmed", "three"),
        ],
    );
    let (library, pubmed, scholar) = library();

    let run = DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;

    assert_eq!(pubmed.calls(), 1);
    assert_eq!(scholar.calls(), 1);
    let closing_con = run
        .records
        .iter()
        .find(|r| r.round == Round::Closing && r.persona == Persona::Con)
        .unwrap();
    assert!(closing_con.used_search);
    assert_eq!(closing_con.new_references.len(), 1);
}

// ============================================================
// Failure handling
// ============================================================

#[tokio::test]
async fn test_double_failure_records_placeholder_and_continues() {
    let mut debater = ScriptedDebater::default();
    debater.always_fail.insert((Persona::Con, 3));
    let (library, _, _) = library();

    let run = DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;
    let transcript = aggregate(&run.records).unwrap();

    let failed: Vec<&RoundRecord> = transcript.records().iter().filter(|r| r.failed).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!((failed[0].round, failed[0].persona), (Round::Deepen, Persona::Con));
    assert!(failed[0].new_references.is_empty());
    assert_eq!(debater.calls_for(Persona::Con, 3).len(), 2);

    // Round 4 still runs, and CON sees PRO's real round 3
    let con_round4 = debater.first_request(Persona::Con, 4).prompt();
    assert!(con_round4.contains("PRO-R3"));
    let pro_round4 = debater.first_request(Persona::Pro, 4).prompt();
    assert!(pro_round4.contains("(no argument: this turn failed)"));
    assert_eq!(transcript.len(), 10);
}

#[tokio::test]
async fn test_single_failure_is_retried_with_identical_request() {
    let mut debater = ScriptedDebater::default();
    debater.fail_once.insert((Persona::Pro, 2));
    let (library, _, _) = library();

    let run = DebateController::new(&debater, &library, logger())
        .run(&brief())
        .await;

    let calls = debater.calls_for(Persona::Pro, 2);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].request, calls[1].request);
    assert!(run.records.iter().all(|r| !r.failed));
}

// ============================================================
// Interruption
// ============================================================

#[tokio::test]
async fn test_interrupt_stops_at_round_boundary() {
    let debater = ScriptedDebater::default();
    let (library, _, _) = library();
    let controller = DebateController::new(&debater, &library, logger());
    let flag = controller.interrupt_handle();
    let rounds_seen = Arc::new(Mutex::new(Vec::new()));
    let seen = rounds_seen.clone();

    let controller = controller.with_round_callback(Arc::new(move |pro, con| {
        assert_eq!(pro.round, con.round);
        seen.lock().unwrap().push(pro.round.number());
        if pro.round == Round::Rebuttal {
            flag.store(true, Ordering::SeqCst);
        }
    }));

    let run = controller.run(&brief()).await;
    assert!(run.interrupted);
    assert_eq!(run.completed_rounds, 2);
    assert_eq!(run.records.len(), 4);
    assert_eq!(*rounds_seen.lock().unwrap(), vec![1, 2]);
    assert!(debater.calls_for(Persona::Pro, 3).is_empty());
}
