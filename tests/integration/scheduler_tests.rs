//! Scheduler semantics: ownership, preemption, defaults and composites.

use commandbot::command::{Command, Lifecycle, ParallelGroup, ParallelPolicy, SequentialGroup};
use commandbot::error::CompositeError;
use commandbot::scheduler::{ScheduleOutcome, Scheduler, SchedulerEvent};
use commandbot::subsystem::{SubsystemId, SubsystemSet};

use crate::mock_hw::{Bench, probe};

fn setup() -> (Scheduler<Bench>, SubsystemId, SubsystemId) {
    let mut sched = Scheduler::new();
    let drive = sched.add_subsystem("drive").unwrap();
    let arm = sched.add_subsystem("arm").unwrap();
    (sched, drive, arm)
}

fn boxed(cmd: impl Command<Bench> + 'static) -> Box<dyn Command<Bench>> {
    Box::new(cmd)
}

#[test]
fn preemption_ends_the_owner_before_the_newcomer_starts() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let a = sched.register(probe("a", drive.into(), None), true).unwrap();
    let b = sched.register(probe("b", drive.into(), None), true).unwrap();

    assert_eq!(sched.schedule(a, &mut ctx), ScheduleOutcome::Scheduled);
    assert_eq!(sched.schedule(b, &mut ctx), ScheduleOutcome::Scheduled);

    assert_eq!(ctx.log, ["init a", "end a interrupted", "init b"]);
    assert_eq!(sched.owner(drive), Some(b));
    assert!(!sched.is_scheduled(a));
}

#[test]
fn non_interruptible_owner_rejects_and_keeps_running() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let guard = sched.register(probe("guard", drive.into(), None), false).unwrap();
    let other = sched.register(probe("other", drive.into(), None), true).unwrap();

    sched.schedule(guard, &mut ctx);
    let outcome = sched.schedule(other, &mut ctx);

    assert_eq!(outcome, ScheduleOutcome::Rejected { blocker: guard });
    assert!(sched.is_scheduled(guard));
    assert_eq!(ctx.count("init other"), 0);

    let mut events = Vec::new();
    sched.drain_events(|e| events.push(e));
    assert_eq!(
        events,
        [
            SchedulerEvent::Initialized(guard),
            SchedulerEvent::Rejected { id: other, blocker: guard },
        ]
    );
}

#[test]
fn rejection_does_not_partially_preempt() {
    let (mut sched, drive, arm) = setup();
    let mut ctx = Bench::default();
    let driver = sched.register(probe("driver", drive.into(), None), true).unwrap();
    let guard = sched.register(probe("guard", arm.into(), None), false).unwrap();
    let both = sched
        .register(probe("both", SubsystemSet::from_ids(&[drive, arm]), None), true)
        .unwrap();

    sched.schedule(driver, &mut ctx);
    sched.schedule(guard, &mut ctx);
    sched.schedule(both, &mut ctx);

    // The interruptible driver survives because the request failed as a whole.
    assert!(sched.is_scheduled(driver));
    assert_eq!(ctx.count("end driver interrupted"), 0);
}

#[test]
fn default_command_backfills_after_owner_finishes() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let idle = sched.register(probe("idle", drive.into(), None), true).unwrap();
    let burst = sched.register(probe("burst", drive.into(), Some(2)), true).unwrap();
    sched.set_default_command(drive, idle).unwrap();

    sched.run(&mut ctx);
    assert_eq!(sched.owner(drive), Some(idle));

    sched.schedule(burst, &mut ctx);
    assert_eq!(ctx.count("end idle interrupted"), 1);

    sched.run(&mut ctx);
    assert_eq!(sched.owner(drive), Some(burst));
    sched.run(&mut ctx);

    // Finished and backfilled within the same tick.
    assert_eq!(ctx.count("end burst done"), 1);
    assert_eq!(sched.owner(drive), Some(idle));
    assert_eq!(ctx.count("init idle"), 2);
}

#[test]
fn finished_commands_run_their_last_execute_first() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let once = sched.register(probe("once", drive.into(), Some(1)), true).unwrap();

    sched.schedule(once, &mut ctx);
    sched.run(&mut ctx);

    assert_eq!(ctx.log, ["init once", "exec once", "end once done"]);
    assert_eq!(sched.lifecycle(once), Some(Lifecycle::Idle));
    assert!(sched.running().is_empty());
}

#[test]
fn rescheduling_a_running_command_is_a_noop() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let a = sched.register(probe("a", drive.into(), None), true).unwrap();

    sched.schedule(a, &mut ctx);
    assert_eq!(sched.schedule(a, &mut ctx), ScheduleOutcome::AlreadyScheduled);
    assert_eq!(ctx.count("init a"), 1);
}

#[test]
fn cancel_of_idle_command_is_a_noop() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let a = sched.register(probe("a", drive.into(), None), true).unwrap();

    assert!(!sched.cancel(a, &mut ctx));
    assert!(ctx.log.is_empty());
}

#[test]
fn cancel_owners_can_spare_defaults() {
    let (mut sched, drive, arm) = setup();
    let mut ctx = Bench::default();
    let drive_default = sched.register(probe("cruise", drive.into(), None), true).unwrap();
    let lift = sched.register(probe("lift", arm.into(), None), true).unwrap();
    sched.set_default_command(drive, drive_default).unwrap();
    sched.run(&mut ctx);
    sched.schedule(lift, &mut ctx);

    let canceled = sched.cancel_owners(SubsystemSet::from_ids(&[drive, arm]), true, &mut ctx);

    assert_eq!(canceled, 1);
    assert!(sched.is_scheduled(drive_default));
    assert!(!sched.is_scheduled(lift));
}

#[test]
fn sequential_cancel_ends_only_the_active_child() {
    let (mut sched, drive, _) = setup();
    let mut ctx = Bench::default();
    let seq = SequentialGroup::new(
        "seq",
        vec![
            boxed(probe("first", drive.into(), Some(1))),
            boxed(probe("second", drive.into(), None)),
            boxed(probe("third", drive.into(), None)),
        ],
    );
    let id = sched.register(seq, true).unwrap();
    assert_eq!(sched.requirements(id), SubsystemSet::of(drive));

    sched.schedule(id, &mut ctx);
    sched.run(&mut ctx);
    sched.run(&mut ctx);
    sched.cancel(id, &mut ctx);

    assert_eq!(
        ctx.log,
        [
            "init first",
            "exec first",
            "end first done",
            "init second",
            "exec second",
            "end second interrupted",
        ]
    );
    assert_eq!(ctx.count("init third"), 0);
}

#[test]
fn parallel_race_interrupts_the_losers() {
    let (mut sched, drive, arm) = setup();
    let mut ctx = Bench::default();
    let race = ParallelGroup::new(
        "race",
        ParallelPolicy::Race,
        vec![
            boxed(probe("fast", drive.into(), Some(1))),
            boxed(probe("slow", arm.into(), None)),
        ],
    )
    .unwrap();
    let id = sched.register(race, true).unwrap();

    sched.schedule(id, &mut ctx);
    sched.run(&mut ctx);

    assert_eq!(ctx.count("end fast done"), 1);
    assert_eq!(ctx.count("end slow interrupted"), 1);
    assert!(!sched.is_scheduled(id));
    assert_eq!(sched.owner(drive), None);
    assert_eq!(sched.owner(arm), None);
}

#[test]
fn parallel_all_waits_for_every_child() {
    let (mut sched, drive, arm) = setup();
    let mut ctx = Bench::default();
    let all = ParallelGroup::new(
        "all",
        ParallelPolicy::All,
        vec![
            boxed(probe("short", drive.into(), Some(1))),
            boxed(probe("long", arm.into(), Some(3))),
        ],
    )
    .unwrap();
    let id = sched.register(all, true).unwrap();

    sched.schedule(id, &mut ctx);
    sched.run(&mut ctx);
    sched.run(&mut ctx);
    assert!(sched.is_scheduled(id));
    assert_eq!(ctx.count("exec short"), 1);

    sched.run(&mut ctx);
    assert!(!sched.is_scheduled(id));
    assert_eq!(ctx.count("end long done"), 1);
}

#[test]
fn parallel_children_must_not_share_subsystems() {
    let (_, drive, _) = setup();
    let result = ParallelGroup::<Bench>::new(
        "clash",
        ParallelPolicy::All,
        vec![
            boxed(probe("x", drive.into(), None)),
            boxed(probe("y", drive.into(), None)),
        ],
    );
    assert!(matches!(result, Err(CompositeError::OverlappingRequirements)));
}

#[test]
fn empty_group_finishes_on_first_tick() {
    let (mut sched, _, _) = setup();
    let mut ctx = Bench::default();
    let id = sched.register(SequentialGroup::new("empty", Vec::new()), true).unwrap();

    sched.schedule(id, &mut ctx);
    sched.run(&mut ctx);
    assert!(!sched.is_scheduled(id));
}

#[test]
fn blocked_subsystem_refuses_requests_before_initialize() {
    let (mut sched, drive, arm) = setup();
    let mut ctx = Bench::default();
    let mover = sched.register(probe("mover", arm.into(), None), true).unwrap();
    let idle = sched.register(probe("idle", arm.into(), None), true).unwrap();
    let driver = sched.register(probe("driver", drive.into(), None), true).unwrap();
    sched.set_default_command(arm, idle).unwrap();

    sched.set_blocked(arm.into());
    assert_eq!(sched.schedule(mover, &mut ctx), ScheduleOutcome::Blocked);
    assert_eq!(ctx.count("init mover"), 0);
    assert_eq!(sched.schedule(driver, &mut ctx), ScheduleOutcome::Scheduled);

    // Defaults still backfill a blocked subsystem.
    sched.run(&mut ctx);
    assert!(sched.is_scheduled(idle));

    let mut events = Vec::new();
    sched.drain_events(|e| events.push(e));
    assert!(events.contains(&SchedulerEvent::Blocked {
        id: mover,
        subsystems: arm.into(),
    }));

    sched.set_blocked(SubsystemSet::EMPTY);
    assert_eq!(sched.schedule(mover, &mut ctx), ScheduleOutcome::Scheduled);
    assert_eq!(ctx.count("end idle interrupted"), 1);
}
