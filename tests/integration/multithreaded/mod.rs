mod protocol_concurrency_test;
