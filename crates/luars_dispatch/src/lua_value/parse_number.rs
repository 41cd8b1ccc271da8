use crate::lua_value::LuaNumber;

/// Parse a Lua numeral the way `tonumber` and string arithmetic do.
///
/// Accepts surrounding whitespace, an optional sign, decimal integers and
/// floats (`3`, `3.0`, `.5`, `1e10`), hex integers (`0xff`, wrapping modulo
/// 2^64) and hex floats (`0x1.8p1`). Decimal integers that overflow become
/// floats. Words such as `inf` or `nan` are not numerals.
pub fn parse_lua_number(bytes: &[u8]) -> Option<LuaNumber> {
    let s = trim_lua_space(bytes);
    if s.is_empty() {
        return None;
    }

    let (negative, rest) = match s[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if rest.len() >= 2 && rest[0] == b'0' && (rest[1] == b'x' || rest[1] == b'X') {
        return parse_hex(&rest[2..], negative);
    }
    parse_decimal(rest, negative)
}

fn trim_lua_space(bytes: &[u8]) -> &[u8] {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c);
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(start, |p| p + 1);
    &bytes[start..end]
}

fn parse_decimal(s: &[u8], negative: bool) -> Option<LuaNumber> {
    let int_len = s.iter().take_while(|b| b.is_ascii_digit()).count();
    let int_part = &s[..int_len];
    let mut pos = int_len;

    let mut frac_part: &[u8] = &[];
    let mut is_float = false;
    if pos < s.len() && s[pos] == b'.' {
        is_float = true;
        pos += 1;
        let frac_len = s[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        frac_part = &s[pos..pos + frac_len];
        pos += frac_len;
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut exponent: &[u8] = b"0";
    if pos < s.len() && (s[pos] == b'e' || s[pos] == b'E') {
        is_float = true;
        pos += 1;
        let exp_start = pos;
        if pos < s.len() && (s[pos] == b'+' || s[pos] == b'-') {
            pos += 1;
        }
        let digits = s[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        pos += digits;
        exponent = &s[exp_start..pos];
    }

    if pos != s.len() {
        return None;
    }

    // all validated bytes are ASCII
    let text = |b: &[u8]| std::str::from_utf8(b).ok().map(str::to_owned);

    if !is_float {
        let digits = text(int_part)?;
        let signed = if negative {
            format!("-{}", digits)
        } else {
            digits
        };
        if let Ok(i) = signed.parse::<i64>() {
            return Some(LuaNumber::Integer(i));
        }
        // overflowing decimal integers fall back to float
    }

    let normalized = format!(
        "{}{}.{}e{}",
        if negative { "-" } else { "" },
        if int_part.is_empty() { "0".to_owned() } else { text(int_part)? },
        if frac_part.is_empty() { "0".to_owned() } else { text(frac_part)? },
        text(exponent)?,
    );
    normalized.parse::<f64>().ok().map(LuaNumber::Float)
}

fn parse_hex(s: &[u8], negative: bool) -> Option<LuaNumber> {
    let mut mantissa: u64 = 0;
    let mut float_mantissa = 0.0f64;
    let mut any_digit = false;
    let mut found_dot = false;
    let mut fraction_digits: i32 = 0;
    let mut pos = 0;

    while pos < s.len() {
        let ch = s[pos];
        if ch == b'.' {
            if found_dot {
                return None;
            }
            found_dot = true;
        } else if let Some(digit) = (ch as char).to_digit(16) {
            any_digit = true;
            mantissa = mantissa.wrapping_mul(16).wrapping_add(digit as u64);
            float_mantissa = float_mantissa * 16.0 + digit as f64;
            if found_dot {
                fraction_digits += 1;
            }
        } else {
            break;
        }
        pos += 1;
    }

    if !any_digit {
        return None;
    }

    let mut exponent: i32 = 0;
    let mut has_exponent = false;
    if pos < s.len() && (s[pos] == b'p' || s[pos] == b'P') {
        has_exponent = true;
        pos += 1;
        let exp_negative = match s.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        let digits = s[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        for &b in &s[pos..pos + digits] {
            exponent = exponent.saturating_mul(10).saturating_add((b - b'0') as i32);
        }
        if exp_negative {
            exponent = -exponent;
        }
        pos += digits;
    }

    if pos != s.len() {
        return None;
    }

    if !found_dot && !has_exponent {
        let i = mantissa as i64;
        return Some(LuaNumber::Integer(if negative { i.wrapping_neg() } else { i }));
    }

    // each hex digit after '.' scales by 1/16
    let scale = exponent.saturating_sub(fraction_digits.saturating_mul(4));
    let value = float_mantissa * 2.0f64.powi(scale);
    Some(LuaNumber::Float(if negative { -value } else { value }))
}
