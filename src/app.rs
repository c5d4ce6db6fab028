use anyhow::{bail, Context};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pocketpet::config::{load_settings, project_paths, save_settings, Paths, Settings};
use pocketpet::cooldown::CooldownKind;
use pocketpet::error::StorageError;
use pocketpet::inventory::{ItemKind, Shop};
use pocketpet::parental::{ParentalSettings, ScreenKind};
use pocketpet::pet::Pet;
use pocketpet::scheduler::{DeclineScheduler, SchedulerReport};
use pocketpet::session::{ActionOutcome, CareAction, PlayerSession, PurchaseOutcome};
use pocketpet::species::Species;
use pocketpet::storage::{load_parental, save_parental, SaveStore};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pocketpet")]
#[command(about = "A virtual pet that gets hungry, sleepy and grumpy while you're away")]
struct Cli {
    /// Data directory (default: the platform's local data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Save slot to use (default: `default_slot` from settings.json)
    #[arg(long, global = true)]
    slot: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let time pass for the pet, saving as it goes
    Run(RunArgs),
    /// Show the pet, score, cooldowns and inventory
    Status,
    /// Adopt a new pet into the slot (replaces the current one)
    Adopt {
        name: String,
        /// dog, deer, frog, jellyfish or penguin
        #[arg(long, default_value = "dog")]
        species: Species,
    },
    /// Take care of the pet
    Act {
        action: ActionArg,
        /// Item name for feed/gift
        item: Option<String>,
    },
    /// Buy one item from the shop
    Buy { kind: KindArg, item: String },
    /// List what the shop sells
    Shop,
    /// Bring a dead pet back to full health
    Revive,
    /// List save slots
    Slots,
    /// Parental controls
    Parental {
        #[command(subcommand)]
        command: ParentalCommand,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Stop after this many real seconds (default: until the pet dies or play time ends)
    #[arg(long)]
    seconds: Option<u64>,

    /// Simulated seconds per real second
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Fixed simulation step (ms)
    #[arg(long, default_value_t = 100)]
    step_ms: u64,
}

#[derive(Subcommand, Debug)]
enum ParentalCommand {
    Show,
    Enable,
    Disable,
    /// Allowed play window, e.g. `window 15:00 18:30`
    Window {
        #[arg(value_parser = parse_clock)]
        start: NaiveTime,
        #[arg(value_parser = parse_clock)]
        end: NaiveTime,
    },
    /// Zero the play-time statistics
    Reset,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ActionArg {
    Feed,
    Gift,
    Play,
    Vet,
    Exercise,
    Sleep,
    Wake,
}

impl ActionArg {
    fn into_care(self, item: Option<String>) -> anyhow::Result<CareAction> {
        let needs_item = |verb: &str| {
            item.clone()
                .with_context(|| format!("`{verb}` needs an item name"))
        };
        Ok(match self {
            ActionArg::Feed => CareAction::Feed(needs_item("feed")?),
            ActionArg::Gift => CareAction::Gift(needs_item("gift")?),
            ActionArg::Play => CareAction::Play,
            ActionArg::Vet => CareAction::Vet,
            ActionArg::Exercise => CareAction::Exercise,
            ActionArg::Sleep => CareAction::Sleep,
            ActionArg::Wake => CareAction::WakeUp,
        })
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Food,
    Gift,
}

impl From<KindArg> for ItemKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Food => ItemKind::Food,
            KindArg::Gift => ItemKind::Gift,
        }
    }
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got `{s}`"))
}

struct App {
    settings: Settings,
    paths: Paths,
    store: SaveStore,
    slot: String,
}

impl App {
    fn init(cli: &Cli) -> anyhow::Result<Self> {
        let paths = match &cli.data_dir {
            Some(dir) => Paths::under(dir)?,
            None => project_paths()?,
        };
        let settings = load_settings(&paths.settings_path);
        if !paths.settings_path.exists() {
            save_settings(&paths.settings_path, &settings).context("writing default settings")?;
        }
        let slot = cli.slot.clone().unwrap_or_else(|| settings.default_slot.clone());
        let store = SaveStore::new(&paths.save_dir);
        Ok(Self {
            settings,
            paths,
            store,
            slot,
        })
    }

    fn cooldown(&self) -> ChronoDuration {
        self.settings.rules.cooldown()
    }

    /// A missing slot starts a fresh player named after it.
    fn load_or_new(&self) -> anyhow::Result<(PlayerSession, Option<DateTime<Utc>>)> {
        match self.store.load(&self.slot, self.cooldown()) {
            Ok((session, saved_at)) => Ok((session, Some(saved_at))),
            Err(StorageError::NotFound(_)) => {
                let fresh = PlayerSession::new(&self.slot, self.cooldown(), Utc::now());
                Ok((fresh, None))
            }
            Err(e) => Err(e).with_context(|| format!("loading slot `{}`", self.slot)),
        }
    }

    fn load_existing(&self) -> anyhow::Result<PlayerSession> {
        let (session, _) = self
            .store
            .load(&self.slot, self.cooldown())
            .with_context(|| format!("loading slot `{}`", self.slot))?;
        Ok(session)
    }

    fn save(&self, session: &PlayerSession) -> anyhow::Result<()> {
        self.store
            .save(session, &self.slot, Utc::now())
            .with_context(|| format!("saving slot `{}`", self.slot))
    }

    fn gameplay_gate(&self) -> anyhow::Result<ParentalSettings> {
        let parental = load_parental(&self.paths.parental_path);
        if !parental.may_enter(ScreenKind::Gameplay, Local::now().time()) {
            bail!("{}", closed_message(&parental));
        }
        Ok(parental)
    }

    fn dispatch(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Run(args) => self.run_loop(args),
            Command::Status => {
                let session = self.load_existing()?;
                let parental = load_parental(&self.paths.parental_path);
                print_status(&session, &parental);
                Ok(())
            }
            Command::Adopt { name, species } => {
                self.gameplay_gate()?;
                let (mut session, _) = self.load_or_new()?;
                if let Some(old) = session.adopt(Pet::new(name, species)) {
                    println!("{} has gone to live on a farm.", old.name());
                }
                self.save(&session)?;
                print_status(&session, &load_parental(&self.paths.parental_path));
                Ok(())
            }
            Command::Act { action, item } => {
                self.gameplay_gate()?;
                let care = action.into_care(item)?;
                let (mut session, _) = self.load_or_new()?;
                let outcome = session.perform(care, Utc::now(), &self.settings.rules.economy);
                println!("{}", describe_outcome(&outcome));
                self.save(&session)
            }
            Command::Buy { kind, item } => {
                self.gameplay_gate()?;
                let (mut session, _) = self.load_or_new()?;
                match session.buy(&Shop::default(), kind.into(), &item) {
                    PurchaseOutcome::Bought { item, price } => println!(
                        "Bought {} for {price} points ({} left).",
                        item.name,
                        session.score().get()
                    ),
                    PurchaseOutcome::NotSold => println!("The shop doesn't sell `{item}`."),
                    PurchaseOutcome::InsufficientScore { needed } => {
                        println!("That costs {needed} points; you have {}.", session.score().get())
                    }
                }
                self.save(&session)
            }
            Command::Shop => {
                for e in Shop::default().entries() {
                    println!(
                        "{:<5} {:<9} +{:<3} {:>3} pts",
                        e.kind.to_string(),
                        e.item.name,
                        e.item.value,
                        e.price
                    );
                }
                Ok(())
            }
            Command::Revive => {
                let revived = self
                    .store
                    .revive_pet(&self.slot, self.cooldown(), Utc::now())
                    .with_context(|| format!("reviving pet in slot `{}`", self.slot))?;
                if revived {
                    println!("Your pet is back, good as new.");
                } else {
                    println!("There is no pet in slot `{}`.", self.slot);
                }
                Ok(())
            }
            Command::Slots => {
                for slot in self.store.list_slots().context("listing save slots")? {
                    let marker = if slot == self.slot { "*" } else { " " };
                    println!("{marker} {slot}");
                }
                Ok(())
            }
            Command::Parental { command } => self.parental(command),
        }
    }

    fn parental(&self, command: ParentalCommand) -> anyhow::Result<()> {
        let mut parental = load_parental(&self.paths.parental_path);
        match command {
            ParentalCommand::Show => {
                print_parental(&parental);
                return Ok(());
            }
            ParentalCommand::Enable => parental.set_restriction_enabled(true),
            ParentalCommand::Disable => parental.set_restriction_enabled(false),
            ParentalCommand::Window { start, end } => {
                parental.set_allowed_start(Some(start));
                parental.set_allowed_end(Some(end));
            }
            ParentalCommand::Reset => parental.reset_statistics(),
        }
        save_parental(&self.paths.parental_path, &parental).context("saving parental settings")?;
        print_parental(&parental);
        Ok(())
    }

    fn run_loop(&self, args: RunArgs) -> anyhow::Result<()> {
        let mut parental = self.gameplay_gate()?;
        let (mut session, saved_at) = self.load_or_new()?;
        if session.pet().is_none() {
            bail!("slot `{}` has no pet yet; adopt one first", self.slot);
        }

        let rules = self.settings.rules.clone();
        let mut scheduler = DeclineScheduler::from_rules(&rules);

        // offline catch-up
        if let (Some(saved_at), Some(pet)) = (saved_at, session.pet_mut()) {
            let away = Utc::now().signed_duration_since(saved_at);
            let recap = scheduler.catch_up(pet, away, rules.catch_up_max());
            if recap.has_anything() {
                println!("While you were away:");
                announce(pet, &recap);
            }
        }

        let started = Utc::now();
        parental.start_session(started);
        session.start_session(started);
        tracing::info!(slot = %self.slot, speed = args.speed, "session started");

        let sim_step = Duration::from_millis(args.step_ms.max(1));
        let frame_dt = sim_step.min(Duration::from_millis(100));
        let speed = args.speed.max(1);
        let autosave_every = self.settings.autosave_every();
        let deadline = args.seconds.map(|s| Instant::now() + Duration::from_secs(s));

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;
        let mut autosave_at = Instant::now() + autosave_every;

        loop {
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                println!("Time's up.");
                break;
            }

            // sim fixed-step
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            sim_accum = sim_accum.saturating_add(real_dt.saturating_mul(speed));
            while sim_accum >= sim_step {
                sim_accum -= sim_step;
                let Some(pet) = session.pet_mut() else { break };
                let report = scheduler.advance(pet, sim_step);
                announce(pet, &report);
            }

            if session.pet().map_or(true, Pet::is_dead) {
                println!("Run `pocketpet revive` to bring your pet back.");
                break;
            }
            if !parental.may_enter(ScreenKind::Gameplay, Local::now().time()) {
                println!("{}", closed_message(&parental));
                break;
            }

            // autosave
            if Instant::now() >= autosave_at {
                self.autosave(&session);
                autosave_at = Instant::now() + autosave_every;
            }

            spin_sleep(frame_dt, Instant::now());
        }

        self.finish_session(&mut scheduler, &mut session, &mut parental, Utc::now())?;
        print_status(&session, &parental);
        Ok(())
    }

    /// A failed autosave is reported and play goes on from memory.
    fn autosave(&self, session: &PlayerSession) -> bool {
        match self.save(session) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(slot = %self.slot, err = %format!("{err:#}"), "autosave failed");
                println!("Could not save your pet, will retry.");
                false
            }
        }
    }

    /// Teardown: stops the timers, closes both play clocks and writes
    /// the parental file before the slot, so play time is recorded even
    /// when the slot cannot be saved.
    fn finish_session(
        &self,
        scheduler: &mut DeclineScheduler,
        session: &mut PlayerSession,
        parental: &mut ParentalSettings,
        ended: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        scheduler.stop();
        session.end_session(ended);
        parental.end_session(ended);
        let parental_saved = save_parental(&self.paths.parental_path, parental);
        let slot_saved = self.save(session);
        tracing::info!(slot = %self.slot, "session ended");
        parental_saved.context("saving parental settings")?;
        slot_saved
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,pocketpet=debug".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub(crate) fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let app = App::init(&cli)?;
    app.dispatch(cli.command)
}

/* -----------------------------
   Text output
------------------------------ */

fn announce(pet: &Pet, report: &SchedulerReport) {
    let name = pet.name();
    if report.fell_asleep > 0 {
        println!("{name} collapsed from exhaustion and fell asleep.");
    }
    if report.woke_up > 0 {
        println!("{name} woke up fully rested.");
    }
    if report.became_hungry {
        println!("{name} is starving!");
    }
    if report.became_angry {
        println!("{name} is angry with you.");
    }
    if report.died {
        println!("{name} has died.");
    }
}

fn describe_outcome(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Done { score_delta } => format!("Done ({score_delta:+} points)."),
        ActionOutcome::NoPet => "There is no pet here yet; adopt one first.".to_string(),
        ActionOutcome::PetUnavailable => "Your pet can't do that right now.".to_string(),
        ActionOutcome::CoolingDown { remaining } => {
            format!("Not yet, try again in {}.", fmt_duration(*remaining))
        }
        ActionOutcome::UnknownItem => "You don't have an item by that name.".to_string(),
        ActionOutcome::OutOfStock => "Out of stock; buy more with `pocketpet buy`.".to_string(),
        ActionOutcome::InsufficientScore { needed } => format!("That costs {needed} points."),
        ActionOutcome::AlreadyHealthy => "Your pet is already in perfect health.".to_string(),
    }
}

fn print_status(session: &PlayerSession, parental: &ParentalSettings) {
    let now = Utc::now();
    println!("Player {}  score {}", session.name(), session.score().get());
    match session.pet() {
        None => println!("No pet yet."),
        Some(pet) => {
            let mut mood = vec![if pet.is_dead() {
                "dead"
            } else if pet.is_sleeping() {
                "asleep"
            } else {
                "awake"
            }];
            if pet.is_hungry() {
                mood.push("hungry");
            }
            if pet.is_angry() {
                mood.push("angry");
            }
            println!("{} the {} ({})", pet.name(), pet.species(), mood.join(", "));
            let (v, max) = (pet.vitals(), pet.max_vitals());
            for (label, cur, top) in [
                ("health", v.health, max.health),
                ("sleep", v.sleep, max.sleep),
                ("fullness", v.fullness, max.fullness),
                ("happiness", v.happiness, max.happiness),
            ] {
                println!("  {label:<10}{cur:>4}/{top}");
            }
        }
    }
    for kind in [CooldownKind::Play, CooldownKind::Vet] {
        let left = session.cooldowns().remaining(kind, now);
        if left.is_zero() {
            println!("{kind}: ready");
        } else {
            println!("{kind}: in {}", fmt_duration(left));
        }
    }
    for kind in [ItemKind::Food, ItemKind::Gift] {
        let stock: Vec<String> = session
            .inventory()
            .items(kind)
            .filter(|(_, qty)| *qty > 0)
            .map(|(item, qty)| format!("{} x{qty}", item.name))
            .collect();
        println!("{kind}: {}", if stock.is_empty() { "-".to_string() } else { stock.join(", ") });
    }
    println!(
        "played {} over {} sessions (avg {})",
        fmt_duration(session.total_play_time()),
        session.session_count(),
        fmt_duration(session.average_play_time())
    );
    if let Some(left) = parental.time_remaining(Local::now().time()) {
        println!("play time left today: {}", fmt_duration(left));
    }
}

fn print_parental(p: &ParentalSettings) {
    let clock = |t: Option<NaiveTime>| {
        t.map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
    };
    println!(
        "restrictions {}  window {}-{}",
        if p.restriction_enabled() { "on" } else { "off" },
        clock(p.allowed_start()),
        clock(p.allowed_end())
    );
    println!(
        "total {}  sessions {}  average {}",
        fmt_duration(p.total_play_time()),
        p.session_count(),
        fmt_duration(p.average_session_time())
    );
    if let Some(left) = p.time_remaining(Local::now().time()) {
        println!("window closes in {}", fmt_duration(left));
    }
}

fn closed_message(p: &ParentalSettings) -> String {
    match (p.allowed_start(), p.allowed_end()) {
        (Some(start), Some(end)) => format!(
            "Play time is {}-{}. Come back later!",
            start.format("%H:%M"),
            end.format("%H:%M")
        ),
        _ => "Play time is over for now.".to_string(),
    }
}

fn fmt_duration(d: ChronoDuration) -> String {
    let secs = d.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pocketpet::species::Species;

    fn app_in(dir: &std::path::Path) -> App {
        let paths = Paths::under(dir).unwrap();
        let store = SaveStore::new(&paths.save_dir);
        App {
            settings: Settings::default(),
            paths,
            store,
            slot: "default".to_string(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 15, 0, 0).unwrap()
    }

    #[test]
    fn unwritable_slot_does_not_lose_play_time() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        std::fs::create_dir_all(app.paths.save_dir.join("default.json.tmp")).unwrap();

        let mut session = PlayerSession::new("default", app.cooldown(), t0());
        session.adopt(Pet::new("Rex", Species::Dog));
        let mut parental = ParentalSettings::with_default_window(NaiveTime::MIN);
        let mut scheduler = DeclineScheduler::from_rules(&app.settings.rules);
        parental.start_session(t0());
        session.start_session(t0());

        assert!(!app.autosave(&session));
        assert!(!app.autosave(&session));

        let ended = t0() + ChronoDuration::minutes(20);
        let result = app.finish_session(&mut scheduler, &mut session, &mut parental, ended);
        assert!(result.is_err());
        assert!(scheduler.is_stopped());
        assert_eq!(session.total_play_time(), ChronoDuration::minutes(20));

        let stored = load_parental(&app.paths.parental_path);
        assert_eq!(stored.session_count(), 1);
        assert_eq!(stored.total_play_time(), ChronoDuration::minutes(20));
    }

    #[test]
    fn writable_slot_saves_on_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        let mut session = PlayerSession::new("default", app.cooldown(), t0());
        session.adopt(Pet::new("Rex", Species::Dog));
        let mut parental = ParentalSettings::with_default_window(NaiveTime::MIN);
        let mut scheduler = DeclineScheduler::from_rules(&app.settings.rules);
        session.start_session(t0());

        assert!(app.autosave(&session));
        let result = app.finish_session(&mut scheduler, &mut session, &mut parental, t0());
        assert!(result.is_ok());
        let loaded = app.load_existing().unwrap();
        assert_eq!(loaded.session_count(), 1);
    }
}
