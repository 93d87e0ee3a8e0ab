//! Example: Encode commands into transmit buffers and set the clock.

use chrono::Local;
use x10_cm11a::{encode_command_with_capacity, short_checksum, BridgeConfig, ClockFrame, Command};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = BridgeConfig::from_toml_str(
        r#"
        monitored_house = "A"
        max_entries_per_buffer = 7
        clear_battery_timer = true
        "#,
    )?;

    for text in ["A1,2 on", "B1-8 dim 50", "C all_lights_off", "D5 ext 31:01"] {
        let command: Command = text.parse()?;
        println!("{}", command);
        for buffer in encode_command_with_capacity(&command, config.max_entries_per_buffer)? {
            let bytes = buffer.encode();
            println!("  {:02X?} (checksum {:#04x})", bytes, buffer.checksum());
        }
    }

    let frame = ClockFrame::from_config(&config, Local::now().naive_local());
    println!("\nClock frame: {:02X?} (checksum {:#04x})", frame.encode(), frame.checksum());
    println!("Header 0x0466 checksum: {:#04x}", short_checksum(0x0466));

    Ok(())
}
