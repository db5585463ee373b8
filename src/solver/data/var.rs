#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(u32);

impl Var {
    pub fn new(i: i32) -> Self {
        assert!(i > 0, "Variables are numbered from 1");
        let i = i as u32;

        assert_eq!(i & (0b11 << 30), 0, "Variable id too large");

        Var(i)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Literals are represented as u32.
// The LSB is one, iff the literal is negative.
// The MSB is *always* zero.
// The remaining bits represent the variable.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn new(lit: i32) -> Self {
        assert_ne!(lit, 0, "Literals cant be zero");

        let code = lit.unsigned_abs();
        let code = (code << 1) | ((lit < 0) as u32);
        assert!(code & (1 << 31) == 0, "Lit magnitude too large.");

        Lit(code)
    }

    /// Literal of `var` with the given polarity.
    pub fn with_sign(var: Var, positive: bool) -> Self {
        Lit((var.0 << 1) | (!positive as u32))
    }

    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn is_pos(self) -> bool {
        self.0 & 1 == 0
    }

    #[allow(unused)]
    pub fn is_neg(self) -> bool {
        self.0 & 1 == 1
    }

    /// Signed integer form, sign denoting polarity.
    pub fn to_int(self) -> i32 {
        let magnitude = (self.0 >> 1) as i32;
        if self.is_pos() {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl From<Var> for Lit {
    fn from(v: Var) -> Self {
        Lit(v.0 << 1)
    }
}

impl std::ops::Neg for Lit {
    type Output = Lit;

    fn neg(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

impl std::fmt::Debug for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Lit")
            .field(&format!(
                "{}{}",
                if self.is_pos() { "" } else { "-" },
                self.var().get()
            ))
            .finish()
    }
}

impl std::fmt::Display for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format!(
            "{}{}",
            if self.is_pos() { "" } else { "-" },
            self.var().get()
        )
        .fmt(f)
    }
}
