use crate::Greeting;
use tether_rpc_service::rpc_service;

pub const HELLO_SERVICE: &str = "tether.example.HelloService";

rpc_service! {
    "tether.example.HelloService" {
        /// Returns `"Hello " + name`.
        pub Hello = "hello"(String) -> String;

        /// Returns its argument unchanged.
        pub EchoBytes = "echo_bytes"(Vec<u8>) -> Vec<u8>;

        pub Greet = "greet"(Greeting) -> String;

        /// Sleeps for the given number of milliseconds before answering.
        pub Sleep = "sleep"(i64) -> ();

        /// Always fails on the server with the given message.
        pub Fail = "fail"(String) -> String;
    }
}
