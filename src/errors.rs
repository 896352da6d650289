use crate::utils::handle::Entity;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{} is stale.", _0)]
    StaleEntity(Entity),
    #[fail(display = "{} has no registered storage.", _0)]
    UnregisteredComponent(Entity),
    #[fail(display = "{} already has {}.", _0, _1)]
    AlreadyAttached(Entity, Entity),
    #[fail(display = "{} does not have {}.", _0, _1)]
    NotAttached(Entity, Entity),
    #[fail(display = "{} can not be attached directly.", _0)]
    NotAttachable(Entity),
    #[fail(display = "the data of {} is not writable through this interface.", _0)]
    NotWritable(Entity),
    #[fail(
        display = "payload of {} bytes does not match the {} byte stride of {}.",
        _0, _1, _2
    )]
    PayloadSize(usize, usize, Entity),
}

pub type Result<T> = ::std::result::Result<T, Error>;
