//! Distributions and channels shared by tests.
use crate::channel::Chan;
use crate::kernel::Scalar;
use crate::probab::Prob;

pub fn unif_2<S: Scalar>() -> Prob<S> {
    Prob::uniform(2)
}

pub fn unif_4<S: Scalar>() -> Prob<S> {
    Prob::uniform(4)
}

pub fn dirac_4<S: Scalar>() -> Prob<S> {
    "0 0 1 0".parse().unwrap()
}

pub fn pi1<S: Scalar>() -> Prob<S> {
    "0.2 0.8".parse().unwrap()
}

pub fn pi2<S: Scalar>() -> Prob<S> {
    "0.1 0.1 0.1 0.7".parse().unwrap()
}

pub fn c1<S: Scalar>() -> Chan<S> {
    "0.8 0.2; 0.3 0.7".parse().unwrap()
}

/// 4 secrets, 3 outputs.
pub fn c2<S: Scalar>() -> Chan<S> {
    "0.5 0.5 0; 0 0.5 0.5; 0.5 0 0.5; 1 0 0".parse().unwrap()
}
