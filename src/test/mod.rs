mod stop_and_wait;
