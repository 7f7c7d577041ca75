/// A document that is identified by a string key in its store
pub trait Entity {
    fn id(&self) -> &str;
}
