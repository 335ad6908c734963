//! Ordered set of controllers ticked together each frame

use crate::controller::Controller;
use cadence_core::Result;

/// Owns controllers and updates them in insertion order.
#[derive(Default)]
pub struct AnimationList {
    controllers: Vec<Box<dyn Controller>>,
}

impl AnimationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, controller: Box<dyn Controller>) {
        log::debug!("registered controller '{}'", controller.name());
        self.controllers.push(controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Controller + 'static)> {
        self.controllers.iter().map(|c| &**c)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Controller + 'static)> {
        self.controllers.get_mut(index).map(|c| &mut **c)
    }

    /// Update every controller for this frame. Returns how many recomputed.
    ///
    /// Stops at the first controller that fails; earlier controllers keep
    /// their writes.
    pub fn update(&mut self, global_time: f32) -> Result<usize> {
        let mut recomputed = 0;
        for controller in &mut self.controllers {
            if controller.update(global_time)? {
                recomputed += 1;
            }
        }
        Ok(recomputed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_controller::FunctionController;
    use crate::time_map::RepeatType;
    use cadence_core::{Channel, FnCurve};

    #[test]
    fn updates_all_controllers_in_order() {
        let a = Channel::new("a", 0.0f32);
        let b = Channel::new("b", 0.0f32);
        let mut list = AnimationList::new();
        list.push(Box::new(FunctionController::spanning(
            "a",
            RepeatType::Clamp,
            FnCurve::new(0.0, 10.0, |t: f32| t),
            a.clone(),
        )));
        list.push(Box::new(FunctionController::spanning(
            "b",
            RepeatType::Clamp,
            FnCurve::new(0.0, 10.0, |t: f32| -t),
            b.clone(),
        )));
        assert_eq!(list.len(), 2);

        assert_eq!(list.update(3.0).unwrap(), 2);
        assert_eq!(a.get_float().unwrap(), 3.0);
        assert_eq!(b.get_float().unwrap(), -3.0);

        // Same frame time again: nothing recomputes
        assert_eq!(list.update(3.0).unwrap(), 0);
        let names: Vec<&str> = list.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn first_failure_stops_the_frame() {
        let wrong = Channel::new("flag", false);
        let after = Channel::new("after", 0.0f32);
        let mut list = AnimationList::new();
        list.push(Box::new(FunctionController::spanning(
            "flag",
            RepeatType::Clamp,
            FnCurve::new(0.0, 1.0, |t: f32| t),
            wrong,
        )));
        list.push(Box::new(FunctionController::spanning(
            "after",
            RepeatType::Clamp,
            FnCurve::new(0.0, 1.0, |_t: f32| 7.0f32),
            after.clone(),
        )));
        assert!(list.update(0.5).is_err());
        assert_eq!(after.get_float().unwrap(), 0.0);
    }
}
