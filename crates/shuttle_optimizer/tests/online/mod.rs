mod basic_insertion_strategy_tests;
