use crate::models::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMessage {
    pub name: String,
}

impl Message for TestMessage {
    const NAME: &'static str = "tests.TestMessage";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherMessage {
    pub value: i32,
}

impl Message for OtherMessage {
    const NAME: &'static str = "tests.OtherMessage";
}
