use crate::error::Result;
use crate::instruction::Instruction;
use crate::interpreter::Interpreter;

/// The eight compass directions, numbered clockwise from West.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    West = 0,
    NorthWest = 1,
    #[default]
    North = 2,
    NorthEast = 3,
    East = 4,
    SouthEast = 5,
    South = 6,
    SouthWest = 7,
}

impl Facing {
    const ALL: [Facing; 8] = [
        Facing::West,
        Facing::NorthWest,
        Facing::North,
        Facing::NorthEast,
        Facing::East,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
    ];

    /// Direction for `index`, taken modulo 8.
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index % 8)]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn turned_left(self) -> Self {
        Self::from_index(self.index() + 7)
    }

    pub fn turned_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Unit step `(dx, dy)`. North is negative y.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Facing::West => (-1, 0),
            Facing::NorthWest => (-1, -1),
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::East => (1, 0),
            Facing::SouthEast => (1, 1),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
        }
    }
}

/// A dancer on the grid: a pose plus the program driving it.
#[derive(Debug, Clone)]
pub struct Robot {
    x: i32,
    y: i32,
    facing: Facing,
    interpreter: Interpreter,
}

impl Robot {
    /// A robot at the origin facing North, about to run `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            x: 0,
            y: 0,
            facing: Facing::default(),
            interpreter: Interpreter::new(program),
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Back to the origin facing North. The program position is kept.
    pub fn reset_position(&mut self) {
        self.x = 0;
        self.y = 0;
        self.facing = Facing::default();
    }

    /// Fetch and apply one instruction, returning it.
    pub fn step(&mut self) -> Result<Instruction> {
        let instruction = self.interpreter.next_instruction()?;
        let (dx, dy) = self.facing.offset();
        match instruction {
            Instruction::Forward => {
                self.x += dx;
                self.y += dy;
            }
            Instruction::Backward => {
                self.x -= dx;
                self.y -= dy;
            }
            Instruction::TurnLeft => self.facing = self.facing.turned_left(),
            Instruction::TurnRight => self.facing = self.facing.turned_right(),
            Instruction::Pause | Instruction::Finished => {}
        }
        Ok(instruction)
    }

    /// One simulation tick. Returns true once the program is exhausted.
    pub fn tick(&mut self) -> Result<bool> {
        Ok(self.step()? == Instruction::Finished)
    }
}

/// Run `program` and record the token of every executed instruction, up to
/// `capacity` of them.
///
/// The result is a flat program with no loops that replays the same moves.
pub fn realized_trace(program: &str, capacity: usize) -> Result<String> {
    let mut robot = Robot::new(program);
    let mut trace = String::with_capacity(capacity);
    while trace.len() < capacity {
        match robot.step()?.token() {
            Some(token) => trace.push(char::from(token)),
            None => break,
        }
    }
    Ok(trace)
}


#[cfg(test)]
mod proptests {
    use super::{Robot, realized_trace};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn trace_replays_same_path(program in "([FBlr-]|[2-4][FBlr-]{1,3}\\.){0,12}") {
            let trace = realized_trace(&program, 1000).unwrap();
            let mut original = Robot::new(program.as_str());
            let mut replay = Robot::new(trace);
            loop {
                let a = original.tick().unwrap();
                let b = replay.tick().unwrap();
                prop_assert_eq!(a, b);
                prop_assert_eq!(original.position(), replay.position());
                prop_assert_eq!(original.facing(), replay.facing());
                if a {
                    break;
                }
            }
        }
    }
}
