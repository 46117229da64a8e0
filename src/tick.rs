//! 100 ms tick source.
//!
//! TIM22 runs as an auto-reloading up-counter clocked at 10 kHz and
//! overflows once per [`TICK_PERIOD_MS`](crate::TICK_PERIOD_MS). Its update
//! interrupt is the only interrupt context in the firmware: it acknowledges
//! the overflow and raises [`TICK`], nothing else.
//!
//! The counter reloads itself in hardware, so the period does not drift
//! with interrupt latency.

use embassy_stm32::pac;
use pac::interrupt;
use voltmeter_core::TickFlag;

use crate::TICK_PERIOD_MS;

/// Flag shared between the TIM22 interrupt and the scheduler loop
pub static TICK: TickFlag = TickFlag::new();

/// TIM22 kernel clock, see `create_clock_config` (HSI16, APB2 /1)
const TIMER_CLOCK_HZ: u32 = 16_000_000;

/// Counter rate after the prescaler
const COUNTER_HZ: u32 = 10_000;

const PRESCALER: u16 = (TIMER_CLOCK_HZ / COUNTER_HZ - 1) as u16;

const RELOAD: u16 = (COUNTER_HZ * TICK_PERIOD_MS / 1000 - 1) as u16;

/// TIM22 update interrupt handler.
///
/// Clears the update flag and raises the tick.
#[interrupt]
fn TIM22() {
    pac::TIM22.sr().modify(|w| w.set_uif(false));
    TICK.raise();
}

/// Configures TIM22 for the tick period without starting it.
///
/// The update generated to latch the prescaler is cleared again so the
/// first tick arrives a full period after [`start_tick_timer`].
pub fn setup_tick_timer() {
    let tim = pac::TIM22;

    pac::RCC.apb2enr().modify(|w| w.set_tim22en(true));

    tim.psc().write_value(PRESCALER);
    tim.arr().write(|w| w.set_arr(RELOAD));
    tim.egr().write(|w| w.set_ug(true));
    tim.sr().modify(|w| w.set_uif(false));
    tim.dier().modify(|w| w.set_uie(true));

    TICK.clear();
}

/// Starts the counter and unmasks its interrupt.
pub fn start_tick_timer() {
    pac::TIM22.cr1().modify(|w| w.set_cen(true));

    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::TIM22);
    };
}
