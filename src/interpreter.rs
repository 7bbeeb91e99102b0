use crate::error::{DanceError, Result};
use crate::instruction::{Instruction, Token};

/// Bookkeeping for one open loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Passes through the body already completed.
    pub iterations_done: u8,
    /// The digit that opened the loop (0..=9).
    pub iteration_limit: u8,
    /// Index of the first body token, right after the digit.
    pub return_index: usize,
    /// Instructions emitted by the interpreter when the current pass began.
    pub pass_start: u64,
}

/// Step-wise interpreter for dance programs.
///
/// Loops are a digit, a body and a `.` terminator. The body always runs at
/// least once: a digit `d` runs it `max(d, 1)` times, so `0` and `1` both
/// mean a single pass. Loop tokens never reach the caller; every call to
/// [`Interpreter::next_instruction`] yields exactly one semantic instruction.
///
/// A body pass that emits nothing ends its loop, since every later pass would
/// emit nothing too. Each call therefore touches every token a bounded number
/// of times, however deeply empty loops are nested.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: String,
    ip: usize,
    frames: Vec<LoopFrame>,
    emitted: u64,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ip: 0,
            frames: Vec::new(),
            emitted: 0,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    /// Open loops, innermost last.
    pub fn loop_stack(&self) -> &[LoopFrame] {
        &self.frames
    }

    /// Advance to the next move, turn or pause.
    ///
    /// Returns `Finished` once the pointer runs off the end, and keeps
    /// returning it on later calls. Loops still open at that point are
    /// ignored.
    pub fn next_instruction(&mut self) -> Result<Instruction> {
        let bytes = self.program.as_bytes();
        loop {
            let Some(&byte) = bytes.get(self.ip) else {
                return Ok(Instruction::Finished);
            };
            let index = self.ip;
            self.ip += 1;

            match Token::from_byte(byte) {
                Some(Token::Move(instruction)) => {
                    self.emitted += 1;
                    return Ok(instruction);
                }
                Some(Token::LoopStart(limit)) => self.frames.push(LoopFrame {
                    iterations_done: 0,
                    iteration_limit: limit,
                    return_index: self.ip,
                    pass_start: self.emitted,
                }),
                Some(Token::LoopEnd) => {
                    let Some(frame) = self.frames.last_mut() else {
                        return Err(DanceError::UnbalancedLoops { index, unclosed: 0 });
                    };
                    let idle_pass = frame.pass_start == self.emitted;
                    if idle_pass || frame.iterations_done + 1 >= frame.iteration_limit {
                        self.frames.pop();
                    } else {
                        frame.iterations_done += 1;
                        frame.pass_start = self.emitted;
                        self.ip = frame.return_index;
                    }
                }
                None => {
                    // Everything before `index` was ASCII, so it is a char boundary.
                    let token = self.program[index..].chars().next().unwrap_or(byte as char);
                    return Err(DanceError::InvalidToken { token, index });
                }
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::Interpreter;
    use crate::instruction::Instruction;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flat_programs_replay_verbatim(
            moves in prop::collection::vec(
                prop::sample::select(vec![b'F', b'B', b'l', b'r', b'-']),
                0..64,
            )
        ) {
            let program: String = moves.iter().map(|&b| b as char).collect();
            let mut interpreter = Interpreter::new(program);
            for &expected in &moves {
                let instruction = interpreter.next_instruction().unwrap();
                prop_assert_eq!(instruction.token(), Some(expected));
            }
            prop_assert_eq!(interpreter.next_instruction(), Ok(Instruction::Finished));
        }

        #[test]
        fn single_loop_repeats_body(count in 0u8..10, body in "[FBlr-]{1,5}") {
            let program = format!("{count}{body}.");
            let mut interpreter = Interpreter::new(program);
            let mut produced = 0usize;
            while interpreter.next_instruction().unwrap() != Instruction::Finished {
                produced += 1;
            }
            prop_assert_eq!(produced, body.len() * usize::from(count.max(1)));
        }
    }
}
