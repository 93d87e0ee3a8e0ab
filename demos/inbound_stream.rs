//! Example: Decode a captured byte stream from the interface.

use x10_cm11a::{BridgeConfig, InboundDecoder, InterfaceEvent};

// Poll, E1 E2 upload, poll, E on upload, power failure
const CAPTURE: &[&[u8]] = &[
    &[0x5A],
    &[0x03, 0x00, 0x16, 0x1E],
    &[0x5A],
    &[0x02, 0x01, 0x12],
    &[0xA5],
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = BridgeConfig::builder().event_capacity(16).build();
    let (mut decoder, mut commands) = InboundDecoder::from_config(&config)?;

    let listener = tokio::spawn(async move {
        while let Ok(command) = commands.recv().await {
            println!("Command: {}", command);
        }
    });

    for chunk in CAPTURE {
        for event in decoder.feed(chunk)? {
            match event {
                InterfaceEvent::Poll => {
                    println!("Poll: replying PC_READY");
                    decoder.poll_acknowledged();
                }
                InterfaceEvent::PowerFailure => println!("Power failure: clock frame needed"),
                InterfaceEvent::Command(_) => {}
            }
        }
    }

    drop(decoder);
    listener.await?;
    Ok(())
}
