#[cfg(log = "log_dummy")]
use cortex_m_log::printer::dummy::Dummy;
#[cfg(log = "log_itm")]
use cortex_m_log::destination::Itm as ItmDestination;
#[cfg(log = "log_itm")]
use cortex_m_log::printer::itm::Itm;
#[cfg(any(log = "log_semihosting", log = "log_itm"))]
use cortex_m_log::modes::InterruptOk;
#[cfg(log = "log_semihosting")]
use cortex_m_log::printer::semihosting::Semihosting;
#[cfg(any(log = "log_semihosting", log = "log_itm"))]
use cortex_m_log::printer::Printer;

#[cfg(log = "log_dummy")]
pub fn create() -> Result<Dummy, ()> {
    Ok(Dummy::new())
}

#[cfg(log = "log_semihosting")]
pub fn create() -> Result<impl Printer, ()> {
    Semihosting::<InterruptOk, _>::stdout()
}

#[cfg(log = "log_itm")]
pub fn create(itm: cortex_m::peripheral::ITM) -> Result<impl Printer, ()> {
    Ok(Itm::<InterruptOk>::new(ItmDestination::new(itm)))
}

macro_rules! debug_guard {
    ($($args:tt)+) => {
        if cfg!(level = "level_debug") {
            $($args)+;
        }
    }
}

macro_rules! info_guard {
    ($($args:tt)+) => {
        if cfg!(level = "level_debug") || cfg!(level = "level_info") {
            $($args)+;
        }
    }
}

// printer write errors are dropped: there is nowhere left to report them
macro_rules! emit {
    (
        $printer: expr,
        $($args:tt)+
    ) => {{
        use core::fmt::Write as _;
        use cortex_m_log::printer::Printer as _;
        let _ = writeln!($printer.destination(), $($args)+);
    }}
}

macro_rules! debug {
    (
        $printer: expr,
        $($args:tt)+
    ) => {
        debug_guard!(emit!($printer, $($args)+))
    }
}

macro_rules! info {
    (
        $printer:expr,
        $($args:tt)+
    ) => {
        info_guard!(emit!($printer, $($args)+))
    }
}

macro_rules! warn {
    (
        $printer:expr,
        $($args:tt)+
    ) => {
        info_guard!(emit!($printer, $($args)+))
    }
}

macro_rules! error {
    (
        $printer:expr,
        $($args:tt)+
    ) => {
        emit!($printer, $($args)+)
    }
}
