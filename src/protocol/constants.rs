//! Constants for the Roomba 500-series Open Interface

// Telemetry frame header
pub const FRAME_HEADER: u8 = 0x13;

// Mode opcodes
pub const OP_START: u8 = 128; // Off -> Passive
pub const OP_SAFE: u8 = 131; // Safe mode (safety features active)
pub const OP_FULL: u8 = 132; // Full mode (no safety features)
pub const OP_POWER: u8 = 133; // Power down to sleep

// Cleaning behavior opcodes (robot runs these in Passive)
pub const OP_SPOT: u8 = 134; // Spot cleaning pattern
pub const OP_CLEAN: u8 = 135; // Default cleaning pass
pub const OP_MAX: u8 = 136; // Clean until the battery dies
pub const OP_SEEK_DOCK: u8 = 143; // Drive to the charging dock

// Actuation opcodes
pub const OP_DRIVE: u8 = 137; // Velocity + turn radius
pub const OP_MOTORS: u8 = 138; // Brush / vacuum bitmask
pub const OP_LEDS: u8 = 139; // LED bits + power button color/intensity
pub const OP_DRIVE_DIRECT: u8 = 145; // Per-wheel velocities
pub const OP_DRIVE_PWM: u8 = 146; // Per-wheel raw PWM

// Streaming opcodes
pub const OP_STREAM: u8 = 148; // Start streaming a sensor list (every 15ms)
pub const OP_PAUSE_RESUME_STREAM: u8 = 150; // Flag byte: 0 = pause, 1 = resume

// Drive command ranges (mm/s, mm)
pub const VELOCITY_MIN: i16 = -500;
pub const VELOCITY_MAX: i16 = 500;
pub const RADIUS_MIN: i16 = -2000;
pub const RADIUS_MAX: i16 = 2000;
pub const PWM_MIN: i16 = -255;
pub const PWM_MAX: i16 = 255;

// Special turn radius codes (outside the documented mm range)
pub const RADIUS_STRAIGHT: u16 = 0x8000;
pub const RADIUS_SPIN_CW: u16 = 0xFFFF;
pub const RADIUS_SPIN_CCW: u16 = 0x0001;

// Motors command bits
pub const MOTOR_SIDE_BRUSH: u8 = 0x01;
pub const MOTOR_VACUUM: u8 = 0x02;
pub const MOTOR_MAIN_BRUSH: u8 = 0x04;
pub const MOTOR_SIDE_BRUSH_OPPOSITE: u8 = 0x08;
pub const MOTOR_MAIN_BRUSH_OPPOSITE: u8 = 0x10;

// LEDs command bits
pub const LED_DEBRIS: u8 = 0x01;
pub const LED_SPOT: u8 = 0x02;
pub const LED_DOCK: u8 = 0x04;
pub const LED_CHECK_ROBOT: u8 = 0x08;

// Power button color scale endpoints (0 = green, 255 = red)
pub const LED_COLOR_GREEN: u8 = 0;
pub const LED_COLOR_RED: u8 = 255;
pub const LED_COLOR_DEFAULT: u8 = 127;

// Bumps-and-wheel-drops packet bits
pub const BUMP_RIGHT: u8 = 0x01;
pub const BUMP_LEFT: u8 = 0x02;
pub const WHEEL_DROP_RIGHT: u8 = 0x04;
pub const WHEEL_DROP_LEFT: u8 = 0x08;

// Wheel-overcurrents packet bits
pub const OVERCURRENT_SIDE_BRUSH: u8 = 0x01;
pub const OVERCURRENT_MAIN_BRUSH: u8 = 0x04;
pub const OVERCURRENT_RIGHT_WHEEL: u8 = 0x08;
pub const OVERCURRENT_LEFT_WHEEL: u8 = 0x10;

// Buttons packet bits
pub const BUTTON_CLEAN: u8 = 0x01;
pub const BUTTON_SPOT: u8 = 0x02;
pub const BUTTON_DOCK: u8 = 0x04;
pub const BUTTON_MINUTE: u8 = 0x08;
pub const BUTTON_HOUR: u8 = 0x10;
pub const BUTTON_DAY: u8 = 0x20;
pub const BUTTON_SCHEDULE: u8 = 0x40;
pub const BUTTON_CLOCK: u8 = 0x80;
