//! Conveyor behaviors.

use crate::app::context::RobotContext;
use crate::app::controls::joystick;
use crate::app::ports::Channel;
use crate::command::{RunCommand, StartEndCommand};
use crate::subsystem::SubsystemSet;

fn stop_conveyor(ctx: &mut RobotContext) {
    ctx.outputs.stop(Channel::Conveyor);
}

fn follow_joystick(ctx: &mut RobotContext) {
    let power = ctx.inputs.axis(joystick::AXIS_Y);
    ctx.outputs.set_power(Channel::Conveyor, power);
}

fn feed(ctx: &mut RobotContext) {
    let power = ctx.config.intake.conveyor_feed_power;
    ctx.outputs.set_power(Channel::Conveyor, power);
}

/// Conveyor power follows the joystick Y axis until interrupted.
pub fn conveyor_override(conveyor: SubsystemSet) -> RunCommand<RobotContext> {
    RunCommand::new("ConveyorOverride", conveyor, follow_joystick, stop_conveyor)
}

/// Run the conveyor at feed power while scheduled.
pub fn conveyor_feed(conveyor: SubsystemSet) -> StartEndCommand<RobotContext> {
    StartEndCommand::new("ConveyorFeed", conveyor, feed, stop_conveyor)
}
