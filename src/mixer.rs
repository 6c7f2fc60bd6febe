use crate::config::MixerConfig;
use crate::controllers::PID_SCALE;
use crate::types::{ActuatorCommand, ArmState, AxisEfforts};

/// Which sign of an axis effort a channel receives.
#[derive(Clone, Copy)]
enum Pair {
    Positive,
    Negative,
}

use Pair::*;

// X layout, columns: pitch, roll, yaw
#[rustfmt::skip]
const MAP: [[Pair; 3]; 4] = [
    [Positive, Negative, Negative], /* A front right */
    [Negative, Negative, Positive], /* B rear right */
    [Negative, Positive, Negative], /* C rear left */
    [Positive, Positive, Positive], /* D front left */
];

#[inline]
fn share(pair: Pair, effort: i32) -> i64 {
    let effort = effort as i64;
    match pair {
        Positive => effort.max(0),
        Negative => (-effort).max(0),
    }
}

/// Base throttle plus the three axis efforts onto the four channels, then
/// the safety envelope.
///
/// Pure: identical inputs give an identical command. Every channel ends in
/// `[floor, ceiling]`, and a stop or any state but `Armed` pins all of them
/// to `floor`.
pub fn mix(
    throttle: u32,
    efforts: &AxisEfforts,
    arm_state: ArmState,
    stop_requested: bool,
    config: &MixerConfig,
) -> ActuatorCommand {
    if stop_requested || arm_state != ArmState::Armed {
        return ActuatorCommand::uniform(config.floor);
    }

    let base = throttle as i64 * config.throttle_gain as i64 / PID_SCALE as i64;
    let axes = [efforts.pitch, efforts.roll, efforts.yaw];
    let mut duty = [0u32; 4];
    for (ch, out) in duty.iter_mut().enumerate() {
        let mut value = base + config.offsets[ch] as i64;
        for (pair, effort) in MAP[ch].iter().zip(axes.iter()) {
            value += share(*pair, *effort);
        }
        // ceiling wins over floor
        *out = value.max(config.floor as i64).min(config.ceiling as i64) as u32;
    }

    ActuatorCommand { a: duty[0], b: duty[1], c: duty[2], d: duty[3] }
}

pub trait MotorCtrl {
    fn set_duty(&mut self, cmd: &ActuatorCommand);
}

/// Four PWM channels in A B C D order.
pub struct Motors<P> {
    pub pin: P,
    pub max_duty: u32,
}

macro_rules! impl_motor_ctrl {
    ($num:expr, $($pin:ident $nr:tt)+) => (
        impl<$($pin),+> Motors<($($pin),+)>
        where $($pin: ehal::PwmPin<Duty = u32>),+
        {
            /// Enables every channel at the floor. Writes are capped at
            /// `absolute_max` or the timer's own maximum, whichever is lower.
            pub fn new(mut pin: ($($pin),+), absolute_max: u32, floor: u32) -> Self {
                let mut max_duty = absolute_max;
                $( max_duty = max_duty.min(pin.$nr.get_max_duty()); )+
                $(
                    pin.$nr.set_duty(floor.min(max_duty));
                    pin.$nr.enable();
                )+
                Motors { pin, max_duty }
            }

            pub fn get_duty(&self) -> [u32; $num] {
                [ $( self.pin.$nr.get_duty() ),+ ]
            }
        }

        impl<$($pin),+> MotorCtrl for Motors<($($pin),+)>
        where $($pin: ehal::PwmPin<Duty = u32>),+ {
            fn set_duty(&mut self, cmd: &ActuatorCommand) {
                let duty = cmd.channels();
                let max_duty = self.max_duty;
                $( self.pin.$nr.set_duty(duty[$nr].min(max_duty)); )+
            }
        }
    )
}

impl_motor_ctrl!(4, A 0 B 1 C 2 D 3);
