mod frame;

use common::{log_debug, log_trace};

use crate::error::{CollectorError, Result};

pub use frame::{CallSeed, Frame};

/* Here is what happens during a call, as seen by the collector:
 * +------------------------------+-----------------------------+
 * | Caller                       | Callee                      |
 * +------------------------------+-----------------------------+
 * | read(.., fwd: Receiver/Arg)  |                             |
 * |                              | enter_call()                |
 * |                              | read(.., fwd: Return)       |
 * |                              | exit_call()                 |
 * | read(ReturnValue)            |                             |
 * +------------------------------+-----------------------------+
 * - Forwarded reads fill the pending call seed, which `enter_call()` consumes
 *   to build the callee's frame.
 * - A seed not consumed by the time the caller's next instruction opens belongs
 *   to a call into uninstrumented code and is dropped.
 * - The returned descriptor is kept until the caller reads it or another callee returns.
 */

/// The stack of active frames of one target thread.
/// Its depth equals the call nesting depth of the instrumented code.
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, seed: CallSeed) {
        log_trace!(depth = self.frames.len() + 1, "Pushing frame with seed {:?}", seed);
        self.frames.push(Frame::from_seed(seed));
    }

    pub fn pop(&mut self) -> Result<Frame> {
        let frame = self.frames.pop().ok_or(CollectorError::StackUnderflow)?;
        log_trace!(depth = self.frames.len(), "Popped frame");
        if self.frames.is_empty() {
            log_debug!("Call stack is empty");
        }
        Ok(frame)
    }

    pub fn top(&self) -> Result<&Frame> {
        self.frames.last().ok_or(CollectorError::NoActiveFrame)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame> {
        self.frames.last_mut().ok_or(CollectorError::NoActiveFrame)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::with_capacity(crate::config::StackConfig::default().initial_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::ShadowValue;

    #[test]
    fn push_and_pop_balance() {
        let mut stack = CallStack::default();
        for _ in 0..3 {
            stack.push(CallSeed::default());
        }
        assert_eq!(stack.depth(), 3);
        for _ in 0..3 {
            stack.pop().unwrap();
        }
        assert!(stack.is_empty());
        assert_eq!(stack.pop().unwrap_err(), CollectorError::StackUnderflow);
    }

    #[test]
    fn empty_stack_has_no_active_frame() {
        let mut stack = CallStack::default();
        assert_eq!(stack.top().unwrap_err(), CollectorError::NoActiveFrame);
        assert!(stack.top_mut().is_err());
    }

    #[test]
    fn fresh_frames_are_concrete() {
        let mut stack = CallStack::default();
        stack.push(CallSeed::default());
        stack.top_mut().unwrap().set_local(2, ShadowValue::Symbolic);

        stack.push(CallSeed::default());
        let top = stack.top().unwrap();
        assert_eq!(top.local(2), ShadowValue::Concrete);
        assert!(!top.has_receiver());

        stack.pop().unwrap();
        assert_eq!(stack.top().unwrap().local(2), ShadowValue::Symbolic);
    }

    #[test]
    fn seed_populates_new_frame() {
        let mut stack = CallStack::default();
        let mut seed = CallSeed::default().with_receiver(ShadowValue::Reference(5));
        seed.set_arg(2, ShadowValue::Symbolic);
        stack.push(seed);

        let top = stack.top().unwrap();
        assert_eq!(top.receiver(), ShadowValue::Reference(5));
        assert_eq!(top.arg(0), ShadowValue::Concrete);
        assert_eq!(top.arg(2), ShadowValue::Symbolic);
        assert_eq!(top.arg(10), ShadowValue::Concrete);
    }

    #[test]
    fn slots_survive_growth() {
        let mut frame = Frame::default();
        for i in 0..100 {
            frame.set_local(i, ShadowValue::Reference(i as u64));
        }
        for i in 0..100 {
            assert_eq!(frame.local(i), ShadowValue::Reference(i as u64));
        }
    }
}
