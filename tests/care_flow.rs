use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use pocketpet::config::{Economy, Paths, Rules};
use pocketpet::cooldown::CooldownKind;
use pocketpet::inventory::{ItemKind, Shop};
use pocketpet::parental::{ParentalSettings, ScreenKind};
use pocketpet::pet::Pet;
use pocketpet::scheduler::DeclineScheduler;
use pocketpet::session::{ActionOutcome, CareAction, PlayerSession, PurchaseOutcome};
use pocketpet::species::Species;
use pocketpet::storage::{load_parental, save_parental, SaveStore};
use std::time::Duration;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 16, 0, 0).unwrap()
}

#[test]
fn a_day_with_a_frog() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::under(dir.path()).unwrap();
    let store = SaveStore::new(&paths.save_dir);
    let rules = Rules::default();
    let eco = Economy::default();

    let mut session = PlayerSession::new("Mo", rules.cooldown(), t0());
    session.adopt(Pet::new("Kermit", Species::Frog));
    let mut scheduler = DeclineScheduler::from_rules(&rules);

    // ten minutes of neglect: 60 decay ticks
    let pet = session.pet_mut().unwrap();
    let report = scheduler.advance(pet, Duration::from_secs(600));
    assert_eq!(report.decay_ticks, 60);
    assert!(pet.fullness() < 110);

    assert!(session.perform(CareAction::Play, t0(), &eco).is_done());
    assert!(session.perform(CareAction::Exercise, t0(), &eco).is_done());
    assert_eq!(session.score().get(), 25);
    assert!(matches!(
        session.perform(CareAction::Play, t0() + ChronoDuration::seconds(10), &eco),
        ActionOutcome::CoolingDown { .. }
    ));

    assert!(matches!(
        session.buy(&Shop::default(), ItemKind::Food, "apple"),
        PurchaseOutcome::Bought { price: 10, .. }
    ));
    assert!(session.perform(CareAction::Feed("Apple".into()), t0(), &eco).is_done());
    assert_eq!(session.score().get(), 25);

    store.save(&session, "mo", t0()).unwrap();
    let (loaded, saved_at) = store.load("mo", rules.cooldown()).unwrap();
    assert_eq!(saved_at, t0());
    assert_eq!(loaded, session);
    assert_eq!(
        loaded.cooldowns().remaining(CooldownKind::Play, t0() + ChronoDuration::minutes(1)),
        ChronoDuration::minutes(4)
    );
}

#[test]
fn neglect_ends_in_death_and_revive_restores() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path());
    let rules = Rules::default();

    let mut session = PlayerSession::new("Lu", rules.cooldown(), t0());
    session.adopt(Pet::new("Blub", Species::Jellyfish));
    let mut scheduler = DeclineScheduler::from_rules(&rules);
    let report = scheduler.advance(session.pet_mut().unwrap(), Duration::from_secs(24 * 3600));
    assert!(report.died);
    assert!(session.pet().unwrap().is_dead());
    assert_eq!(
        session.perform(CareAction::Exercise, t0(), &Economy::default()),
        ActionOutcome::PetUnavailable
    );

    store.save(&session, "lu", t0()).unwrap();
    let (reloaded, _) = store.load("lu", rules.cooldown()).unwrap();
    assert!(reloaded.pet().unwrap().is_dead());

    assert!(store.revive_pet("lu", rules.cooldown(), t0()).unwrap());
    let (revived, _) = store.load("lu", rules.cooldown()).unwrap();
    let pet = revived.pet().unwrap();
    assert!(!pet.is_dead());
    assert_eq!(pet.vitals(), pet.max_vitals());
}

#[test]
fn parental_window_gates_gameplay_and_counts_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parental_settings.json");
    let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

    let mut parental = ParentalSettings::with_default_window(at(15, 0));
    parental.set_restriction_enabled(true);
    assert!(parental.may_enter(ScreenKind::Gameplay, at(16, 0)));
    assert!(!parental.may_enter(ScreenKind::Gameplay, at(18, 1)));
    assert!(parental.may_enter(ScreenKind::Unrestricted, at(3, 0)));

    parental.start_session(t0());
    parental.end_session(t0() + ChronoDuration::minutes(45));
    parental.start_session(t0());
    parental.end_session(t0() + ChronoDuration::hours(30));
    assert_eq!(parental.session_count(), 1);
    assert_eq!(parental.total_play_time(), ChronoDuration::minutes(45));

    save_parental(&path, &parental).unwrap();
    assert_eq!(load_parental(&path), parental);
}
