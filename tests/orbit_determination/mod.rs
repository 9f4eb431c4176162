mod ground_station;
