use core::fmt;

/// Failures surfaced to callers of the proving system. Arithmetic-level
/// sentinels (inversion of zero, square roots of non-residues) stay as
/// `Option`s in the algebra layer; everything that crosses this crate's
/// boundary is an `Error`.
#[derive(Debug)]
pub enum Error {
    /// The reference string file is malformed or shorter than its
    /// manifest declares.
    InvalidSrs(String),
    /// The reference string holds fewer monomials than the circuit needs.
    SrsTooSmall { required: usize, actual: usize },
    /// The requested circuit size is not a usable FFT domain.
    InvalidDomainSize(usize),
    /// A proof byte-string does not parse against the transcript
    /// manifest.
    MalformedProof(String),
    /// A deserialized group element is not on the curve.
    PointNotOnCurve(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSrs(msg) => write!(f, "invalid reference string: {}", msg),
            Error::SrsTooSmall { required, actual } => write!(
                f,
                "reference string has {} monomials, circuit needs {}",
                actual, required
            ),
            Error::InvalidDomainSize(n) => {
                write!(f, "{} is not a valid evaluation domain size", n)
            },
            Error::MalformedProof(msg) => write!(f, "malformed proof: {}", msg),
            Error::PointNotOnCurve(name) => {
                write!(f, "proof element {} is not a valid curve point", name)
            },
            Error::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
