//! Simulated Motor Demo
//!
//! This example runs the full cascaded controller against a first-order
//! simulated brushed DC motor, with no hardware required.
//!
//! Features demonstrated:
//! - Hardware adapter traits backed by an in-memory plant model
//! - Current test playback and export
//! - Position hold and trajectory tracking
//! - Loop event polling and fault flags

use dcservo_control::{ActuatorCommand, Direction, Gains, Mode};
use dcservo_driver::{Actuator, CurrentSensor, Encoder, SensorError, ServoBuilder};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// First-order motor model shared by all three adapters
///
/// Duty cycle drives current with a single-pole lag; current drives
/// angular velocity; velocity integrates into angle. Units are loose
/// (percent, mA, degrees), chosen so the default gains behave sanely.
struct MotorPlant {
    current_ma: f32,
    velocity_dps: f32,
    angle_deg: f32,
}

impl MotorPlant {
    fn new() -> Self {
        Self {
            current_ma: 0.0,
            velocity_dps: 0.0,
            angle_deg: 0.0,
        }
    }

    /// Advance the plant one current-loop tick with the applied command
    fn step(&mut self, command: &ActuatorCommand) {
        let signed_duty = match command.direction {
            Direction::Forward => command.duty_percent,
            Direction::Reverse => -command.duty_percent,
        };
        // Single-pole lag from duty to current, gain 3 mA per percent
        self.current_ma += 0.2 * (signed_duty * 3.0 - self.current_ma);
        // Torque proportional to current, light viscous damping
        self.velocity_dps += 0.001 * self.current_ma - 0.01 * self.velocity_dps;
        self.angle_deg += self.velocity_dps * 0.001;
    }
}

struct PlantActuator(Arc<Mutex<MotorPlant>>);

impl Actuator for PlantActuator {
    fn apply(&mut self, command: ActuatorCommand) {
        self.0.lock().unwrap().step(&command);
    }
}

struct PlantCurrentSensor(Arc<Mutex<MotorPlant>>);

impl CurrentSensor for PlantCurrentSensor {
    fn read_current(&mut self) -> Result<f32, SensorError> {
        Ok(self.0.lock().unwrap().current_ma)
    }
}

struct PlantEncoder(Arc<Mutex<MotorPlant>>);

impl Encoder for PlantEncoder {
    fn read_angle_degrees(&mut self) -> i32 {
        self.0.lock().unwrap().angle_deg.round() as i32
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Simulated Motor Demo ===\n");

    println!("1. Starting controller against the simulated plant...");
    let plant = Arc::new(Mutex::new(MotorPlant::new()));
    let servo = ServoBuilder::new(
        PlantCurrentSensor(plant.clone()),
        PlantActuator(plant.clone()),
        PlantEncoder(plant.clone()),
    )
    .build()?;
    println!("   ✓ Both control loops running\n");

    println!("2. Tuning loop gains...");
    servo.set_current_gains(Gains::new(0.15, 0.02, 0.0));
    servo.set_position_gains(Gains::new(6.0, 0.4, 0.1));
    println!(
        "   Current loop: {:?}, position loop: {:?}\n",
        servo.current_gains(),
        servo.position_gains()
    );

    println!("3. Running current test (square reference)...");
    servo.start_current_test();
    let deadline = Instant::now() + Duration::from_secs(2);
    while !matches!(servo.mode(), Ok(Mode::Idle)) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    while let Some(event) = servo.try_next_event() {
        println!("   Event: {:?}", event);
    }
    println!("   Current test samples (index, measured, reference):");
    for sample in servo.export_current_test().iter().step_by(10) {
        println!(
            "   {} {:.2} {:.2}",
            sample.index, sample.recorded, sample.reference
        );
    }
    println!();

    println!("4. Holding position at 45 degrees...");
    servo.hold_at(45)?;
    std::thread::sleep(Duration::from_secs(1));
    println!(
        "   Plant angle: {} deg, torque request: {:.2} mA\n",
        plant.lock().unwrap().angle_deg.round(),
        servo.torque_request()
    );

    println!("5. Tracking a ramp trajectory...");
    let ramp: Vec<f32> = (0..400).map(|i| 45.0 + i as f32 * 0.1).collect();
    servo.load_trajectory(ramp)?;
    servo.start_trajectory()?;
    let deadline = Instant::now() + Duration::from_secs(5);
    while !matches!(servo.mode(), Ok(Mode::PositionHold)) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    while let Some(event) = servo.try_next_event() {
        println!("   Event: {:?}", event);
    }
    println!("   Trajectory samples (index, actual, reference):");
    for sample in servo.export_trajectory().iter().step_by(80) {
        println!(
            "   {} {:.2} {:.2}",
            sample.index, sample.recorded, sample.reference
        );
    }
    println!();

    println!("6. Final fault check...");
    if servo.any_fault() {
        eprintln!("   ✗ Fault flags raised during the run");
    } else {
        println!("   ✓ No faults");
    }

    println!("\n=== Demo completed ===");
    Ok(())
}
