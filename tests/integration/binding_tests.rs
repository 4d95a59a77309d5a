//! Trigger bindings and indicator bindings driven through a scheduler.

use commandbot::binding::{BindingTable, IndicatorSource};
use commandbot::command::CommandId;
use commandbot::io::{ButtonId, IndicatorId};
use commandbot::scheduler::Scheduler;
use commandbot::subsystem::SubsystemId;

use crate::mock_hw::{Bench, probe};

const A: ButtonId = ButtonId(0);
const B: ButtonId = ButtonId(1);
const LAMP: IndicatorId = IndicatorId(0);
const LAMP_2: IndicatorId = IndicatorId(1);

struct Rig {
    sched: Scheduler<Bench>,
    table: BindingTable<Bench>,
    ctx: Bench,
    drive: SubsystemId,
}

impl Rig {
    fn new() -> Self {
        let mut sched = Scheduler::new();
        let drive = sched.add_subsystem("drive").unwrap();
        Self {
            sched,
            table: BindingTable::new(),
            ctx: Bench::default(),
            drive,
        }
    }

    fn command(&mut self, name: &'static str) -> CommandId {
        self.sched.register(probe(name, self.drive.into(), None), true).unwrap()
    }

    /// One tick: poll bindings, then run the scheduler.
    fn tick(&mut self) {
        self.table.poll(&mut self.sched, &mut self.ctx);
        self.sched.run(&mut self.ctx);
    }

    fn press(&mut self, id: ButtonId, pressed: bool) {
        self.ctx.press(id, pressed);
        self.tick();
    }
}

#[test]
fn button_held_at_startup_is_not_an_edge() {
    let mut rig = Rig::new();
    let cmd = rig.command("shoot");
    let a = rig.table.triggers_mut().button(A).unwrap();
    rig.table.on_rising(a, cmd).unwrap();

    rig.press(A, true);
    assert!(!rig.sched.is_scheduled(cmd));

    rig.press(A, false);
    rig.press(A, true);
    assert!(rig.sched.is_scheduled(cmd));
}

#[test]
fn falling_edge_fires_on_release() {
    let mut rig = Rig::new();
    let cmd = rig.command("release");
    let a = rig.table.triggers_mut().button(A).unwrap();
    rig.table.on_falling(a, cmd).unwrap();

    rig.tick();
    rig.press(A, true);
    assert!(!rig.sched.is_scheduled(cmd));
    rig.press(A, false);
    assert!(rig.sched.is_scheduled(cmd));
}

#[test]
fn while_true_runs_only_while_held() {
    let mut rig = Rig::new();
    let cmd = rig.command("manual");
    let a = rig.table.triggers_mut().button(A).unwrap();
    rig.table.while_true(a, cmd).unwrap();

    rig.tick();
    rig.press(A, true);
    assert!(rig.sched.is_scheduled(cmd));
    rig.tick();
    assert_eq!(rig.ctx.count("init manual"), 1);

    rig.press(A, false);
    assert!(!rig.sched.is_scheduled(cmd));
    assert_eq!(rig.ctx.count("end manual interrupted"), 1);
}

#[test]
fn toggle_flips_and_resyncs_after_preemption() {
    let mut rig = Rig::new();
    let latched = rig.command("latched");
    let other = rig.command("other");
    let a = rig.table.triggers_mut().button(A).unwrap();
    let toggle = rig.table.toggle(a, latched).unwrap();

    rig.tick();
    rig.press(A, true);
    assert!(rig.sched.is_scheduled(latched));
    assert!(rig.table.latch(toggle));

    rig.press(A, false);
    rig.press(A, true);
    assert!(!rig.sched.is_scheduled(latched));
    assert!(!rig.table.latch(toggle));

    // Turn it on, then let something else take the subsystem.
    rig.press(A, false);
    rig.press(A, true);
    rig.sched.schedule(other, &mut rig.ctx);
    rig.press(A, false);
    assert!(!rig.table.latch(toggle));

    // The next press starts it again instead of canceling.
    rig.press(A, true);
    assert!(rig.sched.is_scheduled(latched));
    assert!(!rig.sched.is_scheduled(other));
}

#[test]
fn gated_trigger_requires_the_parent_to_run() {
    let mut rig = Rig::new();
    let parent = rig.command("parent");
    let arm = rig.sched.add_subsystem("arm").unwrap();
    let child = rig.sched.register(probe("child", arm.into(), None), true).unwrap();
    let t = rig.table.triggers_mut();
    let a = t.button(A).unwrap();
    let b = t.button(B).unwrap();
    let gated = t.gated(parent, b).unwrap();
    rig.table.while_true(a, parent).unwrap();
    rig.table.while_true(gated, child).unwrap();

    rig.tick();
    rig.press(B, true);
    assert!(!rig.sched.is_scheduled(child));

    // Parent starts this tick; the gate sees it on the next sample.
    rig.press(A, true);
    rig.tick();
    assert!(rig.sched.is_scheduled(child));

    rig.press(A, false);
    rig.tick();
    assert!(!rig.sched.is_scheduled(child));
}

#[test]
fn indicators_follow_their_sources() {
    fn parent_running(ctx: &Bench) -> bool {
        ctx.count("init cmd") > 0
    }

    let mut rig = Rig::new();
    let cmd = rig.command("cmd");
    let a = rig.table.triggers_mut().button(A).unwrap();
    let b = rig.table.triggers_mut().button(B).unwrap();
    let toggle = rig.table.toggle(b, cmd).unwrap();
    rig.table.bind_indicator(LAMP, IndicatorSource::Trigger(a)).unwrap();
    rig.table.bind_indicator(LAMP_2, IndicatorSource::Latch(toggle)).unwrap();

    rig.tick();
    rig.press(A, true);
    assert!(rig.ctx.lamps[0]);
    assert!(!rig.ctx.lamps[1]);

    rig.press(B, true);
    assert!(rig.ctx.lamps[1]);

    rig.press(A, false);
    assert!(!rig.ctx.lamps[0]);

    let mut rig = Rig::new();
    let cmd = rig.command("cmd");
    rig.table
        .bind_indicator(LAMP, IndicatorSource::Predicate(parent_running))
        .unwrap();
    rig.tick();
    assert!(!rig.ctx.lamps[0]);
    rig.sched.schedule(cmd, &mut rig.ctx);
    rig.tick();
    assert!(rig.ctx.lamps[0]);
}

#[test]
fn last_indicator_binding_wins() {
    let mut rig = Rig::new();
    let a = rig.table.triggers_mut().button(A).unwrap();
    let b = rig.table.triggers_mut().button(B).unwrap();
    rig.table.bind_indicator(LAMP, IndicatorSource::Trigger(a)).unwrap();
    rig.table.bind_indicator(LAMP, IndicatorSource::Trigger(b)).unwrap();

    rig.press(A, true);
    assert!(!rig.ctx.lamps[0]);
    rig.press(B, true);
    assert!(rig.ctx.lamps[0]);
}

#[test]
fn reset_edges_swallows_held_buttons() {
    let mut rig = Rig::new();
    let cmd = rig.command("cmd");
    let a = rig.table.triggers_mut().button(A).unwrap();
    rig.table.on_rising(a, cmd).unwrap();

    rig.tick();
    rig.ctx.press(A, true);
    rig.table.reset_edges();
    rig.tick();
    assert!(!rig.sched.is_scheduled(cmd));
}

#[test]
fn gated_command_ends_in_the_tick_its_parent_is_released() {
    let mut rig = Rig::new();
    let parent = rig.command("parent");
    let arm = rig.sched.add_subsystem("arm").unwrap();
    let child = rig.sched.register(probe("child", arm.into(), None), true).unwrap();
    let t = rig.table.triggers_mut();
    let a = t.button(A).unwrap();
    let b = t.button(B).unwrap();
    let gated = t.gated(parent, b).unwrap();
    rig.table.while_true(a, parent).unwrap();
    rig.table.while_true(gated, child).unwrap();

    rig.tick();
    rig.press(A, true);
    rig.press(B, true);
    assert!(rig.sched.is_scheduled(child));
    let executed = rig.ctx.count("exec child");

    rig.press(A, false);
    assert!(!rig.sched.is_scheduled(parent));
    assert!(!rig.sched.is_scheduled(child));
    assert_eq!(rig.ctx.count("exec child"), executed);
    assert_eq!(rig.ctx.count("end child interrupted"), 1);

    // The falling edge on the next sample does not end it twice.
    rig.tick();
    assert_eq!(rig.ctx.count("end child interrupted"), 1);
}
