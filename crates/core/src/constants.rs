use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Day-count basis used to turn date offsets into year fractions for XIRR
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default total-value multiple the synthesized terminal NAV aims for
pub const DEFAULT_TARGET_TVPI: Decimal = dec!(1.45);

/// Absolute NPV tolerance at which the XIRR solver accepts a root
pub const DEFAULT_NPV_TOLERANCE: f64 = 1e-6;

/// Bracket width (in rate units) below which the XIRR solver stops refining
pub const DEFAULT_RATE_TOLERANCE: f64 = 1e-10;

/// Iteration bound for the XIRR refinement loop
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Lower bound of the XIRR search domain (-99%)
pub const DEFAULT_MIN_RATE: f64 = -0.99;

/// Upper bound of the XIRR search domain (+1000%)
pub const DEFAULT_MAX_RATE: f64 = 10.0;

/// Decimal precision for multiples (DPI, TVPI, RVPI)
pub const MULTIPLE_PRECISION: u32 = 4;

/// Decimal precision for IRR percentages shown to callers
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Labels attached to the cash flows fed to the XIRR solver
pub const CASH_FLOW_LABEL_CAPITAL_CALL: &str = "CAPITAL_CALL";
pub const CASH_FLOW_LABEL_DISTRIBUTION: &str = "DISTRIBUTION";
pub const CASH_FLOW_LABEL_TERMINAL_NAV: &str = "TERMINAL_NAV";
