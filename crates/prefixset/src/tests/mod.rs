mod map_tests;
