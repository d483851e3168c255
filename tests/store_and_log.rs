// Finished sessions flow through a reporter into the SQLite store and the CSV log.
use std::cell::RefCell;
use std::rc::Rc;

use tempfile::tempdir;

use reflex::games::{GameId, SessionOverrides};
use reflex::report::{Reporter, ResultSink};
use reflex::result::SessionResult;
use reflex::score_log::ScoreLog;
use reflex::session::Session;
use reflex::stats::{ScoreDb, ScoreStore, StoreSink};

fn play_catch_until_out(session: &mut Session, start: u64) {
    session.start(start);
    while let Some(at) = session.next_deadline() {
        session.tick(at);
    }
}

fn play_arrows_correctly(session: &mut Session, start: u64, reaction_ms: u64) {
    session.start(start);
    while !session.has_finished() {
        let Some(round) = session.current_round() else {
            let at = session.next_deadline().unwrap();
            session.tick(at);
            continue;
        };
        let (at, action) = (round.reveal_at + reaction_ms, round.stimulus.correct_action());
        session.act(&action, at).unwrap();
    }
}

#[test]
fn sessions_are_stored_and_logged() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("state").join("scores.db");
    let log = ScoreLog::with_path(dir.path().join("state").join("scores.csv"));

    let db = Rc::new(RefCell::new(ScoreDb::open(&db_path).unwrap()));
    let mut store_sink = StoreSink::new(Rc::clone(&db));
    let mut log_sink = log.clone();
    let reporter = Reporter::new(move |result: &SessionResult| {
        store_sink.deliver(result);
        log_sink.deliver(result);
    });

    let overrides = SessionOverrides {
        rounds: Some(4),
        seed: Some(3),
        ..SessionOverrides::default()
    };
    let mut session = GameId::Arrows
        .new_session(SessionOverrides {
            time_limit_ms: Some(60_000),
            ..overrides
        })
        .unwrap()
        .with_reporter(reporter);

    play_arrows_correctly(&mut session, 0, 300);
    let first = session.result().unwrap().clone();
    play_arrows_correctly(&mut session, 100_000, 200);
    let second = session.result().unwrap().clone();
    assert!(second.score > first.score);

    // an aborted run is reported but neither stored nor logged
    session.start(200_000);
    session.abort(200_500);

    let db = db.borrow();
    assert_eq!(db.query_best("arrows").unwrap(), Some(second.score));
    assert_eq!(
        db.query_best_time("arrows").unwrap(),
        Some(second.elapsed_ms)
    );
    let recent = db.recent(Some("arrows"), 10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].score, second.score);
    assert_eq!(recent[0].avg_reaction_ms, Some(200.0));

    let rows = log.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].game, "arrows");
    assert_eq!(rows[0].rounds, 4);
    assert_eq!(rows[0].correct, 4);
    assert_eq!(rows[0].incorrect, 0);
    assert_eq!(rows[1].avg_ms, Some(200.0));
    assert_eq!(rows[1].tier, second.rating.label());
}

#[test]
fn database_survives_reopening() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.db");

    {
        let db = ScoreDb::open(&path).unwrap();
        let mut sink = StoreSink::new(db);
        let mut session = GameId::Catch
            .new_session(SessionOverrides {
                seed: Some(9),
                ..SessionOverrides::default()
            })
            .unwrap()
            .with_reporter(Reporter::new(move |r: &SessionResult| sink.deliver(r)));
        play_catch_until_out(&mut session, 0);
        assert!(session.has_finished());
    }

    let db = ScoreDb::open(&path).unwrap();
    let recent = db.recent(None, 5).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].game_id, "catch");
    assert_eq!(recent[0].rating, None);
    assert_eq!(db.query_best("catch").unwrap(), Some(0));
}
