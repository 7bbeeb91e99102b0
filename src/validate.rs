use crate::error::{DanceError, Result};
use crate::instruction::Token;

/// Check that `program` only uses the instruction alphabet and that every
/// loop digit is closed by exactly one terminator.
///
/// Reports the first offending character, the first terminator without an
/// open loop, or the number of loops still open at the end.
pub fn check(program: &str) -> Result<()> {
    let mut open = 0usize;
    for (index, ch) in program.char_indices() {
        let token = if ch.is_ascii() {
            Token::from_byte(ch as u8)
        } else {
            None
        };
        match token {
            Some(Token::Move(_)) => {}
            Some(Token::LoopStart(_)) => open += 1,
            Some(Token::LoopEnd) => {
                if open == 0 {
                    return Err(DanceError::UnbalancedLoops { index, unclosed: 0 });
                }
                open -= 1;
            }
            None => return Err(DanceError::InvalidToken { token: ch, index }),
        }
    }
    if open != 0 {
        return Err(DanceError::UnbalancedLoops {
            index: program.len(),
            unclosed: open,
        });
    }
    Ok(())
}

/// Whether `program` is well-formed. See [`check`].
pub fn is_valid(program: &str) -> bool {
    check(program).is_ok()
}
