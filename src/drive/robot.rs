//! Differential drive over a pair of motors

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{Direction, Drive, DriveError, MotorBus, MotorId, Speed, Trim};

/// A two-wheeled robot with one motor per side
///
/// Open loop: nothing measures how fast the wheels actually turn, which is
/// what [`Trim`] is for.
pub struct Robot<M> {
    bus: M,
    left: MotorId,
    right: MotorId,
    trim: Trim,
}

impl<M: MotorBus> Robot<M> {
    /// Take ownership of the bus and release both motors
    pub fn new(mut bus: M, left: MotorId, right: MotorId, trim: Trim) -> Result<Self, DriveError> {
        bus.run(left, Direction::Release)?;
        bus.run(right, Direction::Release)?;
        debug!(left = left.get(), right = right.get(), ?trim, "robot drive ready");

        Ok(Self {
            bus,
            left,
            right,
            trim,
        })
    }

    fn apply(
        &mut self,
        speed: Speed,
        left: Direction,
        right: Direction,
    ) -> Result<(), DriveError> {
        let left_speed = self.trim.apply_left(speed);
        let right_speed = self.trim.apply_right(speed);
        trace!(?left, ?right, left_speed, right_speed, "drive");

        self.bus.set_speed(self.left, left_speed)?;
        self.bus.set_speed(self.right, right_speed)?;
        self.bus.run(self.left, left)?;
        self.bus.run(self.right, right)
    }

    async fn movement(
        &mut self,
        speed: Speed,
        left: Direction,
        right: Direction,
        duration: Option<Duration>,
    ) -> Result<(), DriveError> {
        self.apply(speed, left, right)?;

        if let Some(duration) = duration {
            tokio::time::sleep(duration).await;
            self.stop().await?;
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &M {
        &self.bus
    }
}

#[async_trait]
impl<M: MotorBus> Drive for Robot<M> {
    async fn forward(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError> {
        self.movement(speed, Direction::Forward, Direction::Forward, duration)
            .await
    }

    async fn backward(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError> {
        self.movement(speed, Direction::Backward, Direction::Backward, duration)
            .await
    }

    async fn left(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError> {
        self.movement(speed, Direction::Backward, Direction::Forward, duration)
            .await
    }

    async fn right(&mut self, speed: Speed, duration: Option<Duration>) -> Result<(), DriveError> {
        self.movement(speed, Direction::Forward, Direction::Backward, duration)
            .await
    }

    async fn stop(&mut self) -> Result<(), DriveError> {
        self.bus.run(self.left, Direction::Release)?;
        self.bus.run(self.right, Direction::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BusCall {
        Speed(u8, u8),
        Run(u8, Direction),
    }

    #[derive(Default)]
    struct RecordingBus {
        calls: Vec<BusCall>,
    }

    impl MotorBus for RecordingBus {
        fn set_speed(&mut self, motor: MotorId, speed: u8) -> Result<(), DriveError> {
            self.calls.push(BusCall::Speed(motor.get(), speed));
            Ok(())
        }

        fn run(&mut self, motor: MotorId, direction: Direction) -> Result<(), DriveError> {
            self.calls.push(BusCall::Run(motor.get(), direction));
            Ok(())
        }
    }

    fn create_robot(trim: Trim) -> Robot<RecordingBus> {
        let left = MotorId::new(1).unwrap();
        let right = MotorId::new(2).unwrap();
        Robot::new(RecordingBus::default(), left, right, trim).unwrap()
    }

    fn last_runs(robot: &Robot<RecordingBus>) -> Vec<BusCall> {
        robot
            .bus()
            .calls
            .iter()
            .rev()
            .take(2)
            .rev()
            .copied()
            .collect()
    }

    #[test]
    fn test_new_releases_both_motors() {
        let robot = create_robot(Trim::default());
        assert_eq!(
            robot.bus().calls,
            vec![
                BusCall::Run(1, Direction::Release),
                BusCall::Run(2, Direction::Release),
            ]
        );
    }

    #[tokio::test]
    async fn test_forward_with_trim() {
        let mut robot = create_robot(Trim { left: -5, right: 0 });
        assert_ok!(robot.forward(Speed(200), None).await);

        assert!(robot.bus().calls.contains(&BusCall::Speed(1, 195)));
        assert!(robot.bus().calls.contains(&BusCall::Speed(2, 200)));
        assert_eq!(
            last_runs(&robot),
            vec![
                BusCall::Run(1, Direction::Forward),
                BusCall::Run(2, Direction::Forward),
            ]
        );
    }

    #[tokio::test]
    async fn test_backward() {
        let mut robot = create_robot(Trim::default());
        assert_ok!(robot.backward(Speed(150), None).await);
        assert_eq!(
            last_runs(&robot),
            vec![
                BusCall::Run(1, Direction::Backward),
                BusCall::Run(2, Direction::Backward),
            ]
        );
    }

    #[tokio::test]
    async fn test_turns_spin_in_place() {
        let mut robot = create_robot(Trim::default());

        assert_ok!(robot.left(Speed(200), None).await);
        assert_eq!(
            last_runs(&robot),
            vec![
                BusCall::Run(1, Direction::Backward),
                BusCall::Run(2, Direction::Forward),
            ]
        );

        assert_ok!(robot.right(Speed(200), None).await);
        assert_eq!(
            last_runs(&robot),
            vec![
                BusCall::Run(1, Direction::Forward),
                BusCall::Run(2, Direction::Backward),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_movement_stops() {
        let mut robot = create_robot(Trim::default());
        robot
            .forward(Speed(100), Some(Duration::from_millis(500)))
            .await
            .unwrap();

        assert_eq!(
            last_runs(&robot),
            vec![
                BusCall::Run(1, Direction::Release),
                BusCall::Run(2, Direction::Release),
            ]
        );
    }

    #[tokio::test]
    async fn test_untimed_movement_keeps_running() {
        let mut robot = create_robot(Trim::default());
        assert_ok!(robot.forward(Speed(100), None).await);
        assert_eq!(last_runs(&robot)[1], BusCall::Run(2, Direction::Forward));
    }
}
