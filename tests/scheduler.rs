use chrono::{DateTime, Duration, TimeZone, Utc};
use flashcards_srs::models::sm2::{self, MIN_EASINESS_FACTOR};
use flashcards_srs::{InMemoryStore, MemoryState, Quality, ReviewStore, SqliteStore, record_review};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

fn sample_states() -> Vec<(f64, u32, u32)> {
    let mut states = Vec::new();
    for ef in [1.3, 1.5, 2.0, 2.5, 3.1] {
        for (interval, reps) in [(0, 0), (1, 1), (6, 2), (30, 5), (0, 7)] {
            states.push((ef, interval, reps));
        }
    }
    states
}

#[test]
fn test_output_bounds_hold_for_all_grades() {
    for (ef, interval, reps) in sample_states() {
        for q in -3..=8 {
            let step = sm2::update(Quality::clamped(q), ef, interval, reps);
            assert!(step.easiness_factor >= MIN_EASINESS_FACTOR, "q={q} ef={ef}");
            assert!(step.interval >= 1, "q={q} interval={interval} reps={reps}");
        }
    }
}

#[test]
fn test_failure_always_resets() {
    for (ef, interval, reps) in sample_states() {
        for q in 0..3 {
            let step = sm2::update(Quality::clamped(q), ef, interval, reps);
            assert_eq!(step.repetitions, 0);
            assert_eq!(step.interval, 1);
        }
    }
}

#[test]
fn test_out_of_range_quality_is_clamped() {
    for (ef, interval, reps) in sample_states() {
        assert_eq!(
            sm2::update(Quality::clamped(-5), ef, interval, reps),
            sm2::update(Quality::clamped(0), ef, interval, reps)
        );
        assert_eq!(
            sm2::update(Quality::clamped(99), ef, interval, reps),
            sm2::update(Quality::clamped(5), ef, interval, reps)
        );
    }
}

#[test]
fn test_easiness_is_monotonic_in_quality() {
    for (ef, interval, reps) in sample_states() {
        let efs: Vec<f64> = (0..=5)
            .map(|q| sm2::update(Quality::clamped(q), ef, interval, reps).easiness_factor)
            .collect();
        assert!(efs.windows(2).all(|w| w[0] <= w[1]), "{efs:?}");
    }
}

#[test]
fn test_first_reviews_from_defaults() {
    let first = MemoryState::new(1, now()).reviewed(Quality::clamped(5), now());
    assert_eq!(first.repetitions, 1);
    assert_eq!(first.interval, 1);
    assert!(first.easiness_factor > 2.5);

    let second = first.reviewed(Quality::clamped(5), now());
    assert_eq!(second.repetitions, 2);
    assert_eq!(second.interval, 6);

    let third = second.reviewed(Quality::clamped(5), now());
    assert_eq!(third.repetitions, 3);
    assert_eq!(third.interval, (6.0 * third.easiness_factor).round() as u32);
    assert_eq!(third.interval, 17);
    assert_eq!(third.next_review, now() + Duration::days(17));
}

#[test]
fn test_failure_from_mature_card() {
    let step = sm2::update(Quality::clamped(1), 2.0, 30, 5);
    assert_eq!(step.repetitions, 0);
    assert_eq!(step.interval, 1);
    assert!(step.easiness_factor < 2.0);
    assert!(step.easiness_factor >= MIN_EASINESS_FACTOR);
    assert!((step.easiness_factor - 1.46).abs() < 1e-9);
}

#[test]
fn test_update_is_deterministic() {
    let state = MemoryState {
        easiness_factor: 2.2,
        interval: 12,
        repetitions: 4,
        ..MemoryState::new(9, now())
    };
    assert_eq!(
        state.reviewed(Quality::clamped(4), now()),
        state.reviewed(Quality::clamped(4), now())
    );
}

fn assert_due_scenario<S: ReviewStore>(store: &mut S, deck_id: i64, ids: [i64; 3], now: DateTime<Utc>) {
    for (id, offset) in ids.iter().zip([-1, 0, 1]) {
        let mut state = store.load_state(*id).unwrap();
        state.next_review = now + Duration::days(offset);
        store.save_state(&state).unwrap();
    }

    let due: Vec<i64> = store
        .query_due(deck_id, now)
        .unwrap()
        .into_iter()
        .map(|c| c.flashcard.id)
        .collect();
    assert_eq!(due, vec![ids[0], ids[1]]);
}

#[test]
fn test_due_selection_in_memory() {
    let mut store = InMemoryStore::new();
    // Insert in reverse due order so ordering comes from next_review, not ids
    let c = store.add_flashcard(1, "c", "3", now()).id;
    let b = store.add_flashcard(1, "b", "2", now()).id;
    let a = store.add_flashcard(1, "a", "1", now()).id;

    assert_due_scenario(&mut store, 1, [a, b, c], now());
}

#[test]
fn test_due_selection_in_sqlite() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let deck = store.create_deck("Due", "").unwrap();
    let c = store.add_flashcard(deck.id, "c", "3").unwrap().id;
    let b = store.add_flashcard(deck.id, "b", "2").unwrap().id;
    let a = store.add_flashcard(deck.id, "a", "1").unwrap().id;
    let now = store.current_time().unwrap();

    assert_due_scenario(&mut store, deck.id, [a, b, c], now);
}

#[test]
fn test_review_cycle_through_sqlite() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let deck = store.create_deck("Cycle", "").unwrap();
    let card = store.add_flashcard(deck.id, "q", "a").unwrap();
    let now = store.current_time().unwrap();

    let outcome = record_review(&mut store, card.id, 4, now).unwrap();
    assert_eq!(outcome.next_review, now + Duration::days(1));
    assert!(store.query_due(deck.id, now).unwrap().is_empty());

    store.advance_day().unwrap();
    let tomorrow = store.current_time().unwrap();
    assert_eq!(store.query_due(deck.id, tomorrow).unwrap().len(), 1);

    let outcome = record_review(&mut store, card.id, 2, tomorrow).unwrap();
    assert_eq!(outcome.repetitions, 0);
    assert_eq!(outcome.interval, 1);
    assert_eq!(store.load_state(card.id).unwrap().last_reviewed, Some(tomorrow));
}

#[test]
fn test_forty_perfect_reviews_stay_scheduled() {
    let mut store = InMemoryStore::new();
    let card = store.add_flashcard(1, "q", "a", now());

    let mut last = 0;
    for _ in 0..40 {
        let outcome = record_review(&mut store, card.id, 5, now()).unwrap();
        assert!(outcome.interval >= last);
        assert!(outcome.interval <= sm2::MAX_INTERVAL_DAYS);
        last = outcome.interval;
    }

    let state = store.load_state(card.id).unwrap();
    assert_eq!(state.repetitions, 40);
    assert_eq!(state.interval, sm2::MAX_INTERVAL_DAYS);
    assert_eq!(
        state.next_review,
        now() + Duration::days(i64::from(sm2::MAX_INTERVAL_DAYS))
    );
}
